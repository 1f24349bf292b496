//! `ch-spatial` — the flat static R-tree section.
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`rectangle`] | `RectangleInt2D`, containment, merge, minimum distance   |
//! | [`tree`]      | `TreeNode`, `TreeLevelStart`, `StaticRTree`, fan-out     |
//!
//! Only the search tree itself lives here.  Leaf objects are the segment
//! records of `ch-segment`, and the coordinates they reference are a plain
//! `Coordinate` section decoded by `ch-core`.

pub mod rectangle;
pub mod tree;

#[cfg(test)]
mod tests;

pub use rectangle::RectangleInt2D;
pub use tree::{BRANCHING_FACTOR, LEAF_NODE_SIZE, StaticRTree, TreeLevelStart, TreeNode};
