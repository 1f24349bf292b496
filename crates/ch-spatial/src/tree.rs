//! Static R-tree stored as a flat, level-ordered array.
//!
//! # Data layout
//!
//! Nodes are laid out breadth-first: the root level first, the leaf level
//! last.  `level_starts[k]` is the index of the first node of level `k`, and
//! a final sentinel equals the node count, so level `k` occupies:
//!
//! ```text
//! nodes[ level_starts[k] .. level_starts[k+1] ]
//! ```
//!
//! Parent/child relationships are implied by position; no node stores a
//! reference to another.  Interior nodes fan out by [`BRANCHING_FACTOR`]:
//! the children of the `i`-th node of level `k` are the nodes
//! `level_starts[k+1] + i * BRANCHING_FACTOR ..` clipped to level `k+1`.
//! The `i`-th leaf addresses segment records
//! `i * LEAF_NODE_SIZE .. (i + 1) * LEAF_NODE_SIZE`.
//!
//! # Flat byte layout
//!
//! ```text
//! [ u64 k ][ TreeNode × k ][ u64 l ][ TreeLevelStart × l ]
//! ```

use std::io::{self, Write};
use std::ops::Range;

use log::debug;

use ch_core::codec::fixed;
use ch_core::{FormatError, FormatResult, Record, Section, SectionReader, write_section};

use crate::rectangle::RectangleInt2D;

/// Fan-out of interior tree levels.
pub const BRANCHING_FACTOR: usize = 64;

/// Segment records addressed by one leaf (one 4 KiB page of tree nodes).
pub const LEAF_NODE_SIZE: usize = 4096 / TreeNode::SIZE;

// ── Records ───────────────────────────────────────────────────────────────────

/// One tree node: the rectangle bounding everything beneath it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    pub minimum_bounding_rectangle: RectangleInt2D,
}

impl From<RectangleInt2D> for TreeNode {
    fn from(minimum_bounding_rectangle: RectangleInt2D) -> Self {
        Self { minimum_bounding_rectangle }
    }
}

impl Record for TreeNode {
    const SECTION: Section = Section::TreeNodes;
    const SIZE: usize = RectangleInt2D::SIZE;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        RectangleInt2D::decode(bytes).map(TreeNode::from)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        self.minimum_bounding_rectangle.encode(out);
    }
}

/// Index of the first node of a level (8 bytes).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeLevelStart(pub u64);

impl Record for TreeLevelStart {
    const SECTION: Section = Section::TreeLevelStarts;
    const SIZE: usize = 8;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 8] = fixed(Self::SECTION, bytes)?;
        Ok(Self(u64::from_le_bytes(b)))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_le_bytes());
    }
}

// ── StaticRTree ───────────────────────────────────────────────────────────────

/// The search-tree half of a static R-tree.  Leaf objects (segments) and
/// the coordinates they reference are stored elsewhere.
#[derive(Clone, Debug)]
pub struct StaticRTree {
    nodes: Vec<TreeNode>,
    level_starts: Vec<TreeLevelStart>,
}

impl StaticRTree {
    /// Validate and wrap decoded arrays.
    ///
    /// # Errors
    ///
    /// - [`FormatError::InvalidLevelStarts`] unless `level_starts` is
    ///   non-empty, begins at 0, never decreases, and ends at `nodes.len()`.
    ///   Equal neighbours (an empty level) are allowed.
    /// - [`FormatError::InvalidRectangle`] for the first non-empty node whose
    ///   rectangle has `min > max` on either axis.
    pub fn from_parts(nodes: Vec<TreeNode>, level_starts: Vec<TreeLevelStart>) -> FormatResult<Self> {
        check_level_starts(&level_starts, nodes.len())?;
        if let Some(index) = nodes.iter().position(|n| {
            let r = &n.minimum_bounding_rectangle;
            !r.is_empty() && !r.is_valid()
        }) {
            return Err(FormatError::InvalidRectangle { index });
        }
        Ok(Self { nodes, level_starts })
    }

    /// Build from per-level node lists, root level first.
    ///
    /// Level sizes `{1, 4, 16}` produce `level_starts = [0, 1, 5, 21]`.
    pub fn from_levels(levels: Vec<Vec<TreeNode>>) -> FormatResult<Self> {
        let mut level_starts = Vec::with_capacity(levels.len() + 1);
        let mut nodes = Vec::with_capacity(levels.iter().map(Vec::len).sum());
        for level in levels {
            level_starts.push(TreeLevelStart(nodes.len() as u64));
            nodes.extend(level);
        }
        level_starts.push(TreeLevelStart(nodes.len() as u64));
        Self::from_parts(nodes, level_starts)
    }

    /// Decode the flat layout, failing on the first structural error.
    pub fn load(bytes: &[u8]) -> FormatResult<Self> {
        let mut reader = SectionReader::new(bytes);
        let nodes = reader.read_section::<TreeNode>()?;
        let level_starts = reader.read_section::<TreeLevelStart>()?;
        reader.finish(Section::TreeLevelStarts)?;

        debug!(
            "loaded static rtree: {} nodes in {} levels ({} bytes)",
            nodes.len(),
            level_starts.len().saturating_sub(1),
            bytes.len()
        );
        Self::from_parts(nodes, level_starts)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            16 + self.nodes.len() * TreeNode::SIZE + self.level_starts.len() * TreeLevelStart::SIZE,
        );
        write_section(&mut out, &self.nodes);
        write_section(&mut out, &self.level_starts);
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn level_starts(&self) -> &[TreeLevelStart] {
        &self.level_starts
    }

    /// Number of levels (the sentinel is not a level).
    pub fn level_count(&self) -> usize {
        self.level_starts.len() - 1
    }

    /// Index of the deepest level, `None` for a tree without levels.
    pub fn leaf_level(&self) -> Option<usize> {
        self.level_count().checked_sub(1)
    }

    /// The rectangle of node `index`.
    pub fn bounding_rectangle_of(&self, index: usize) -> FormatResult<RectangleInt2D> {
        self.nodes
            .get(index)
            .map(|n| n.minimum_bounding_rectangle)
            .ok_or(FormatError::OutOfRange {
                section: Section::TreeNodes,
                index,
                len: self.nodes.len(),
            })
    }

    /// Node index range of `level`.
    pub fn level_range(&self, level: usize) -> FormatResult<Range<usize>> {
        if level >= self.level_count() {
            return Err(FormatError::OutOfRange {
                section: Section::TreeLevelStarts,
                index: level,
                len: self.level_count(),
            });
        }
        // Bounded by nodes.len() after validation.
        let start = self.level_starts[level].0 as usize;
        let end = self.level_starts[level + 1].0 as usize;
        Ok(start..end)
    }

    /// The nodes of `level`.
    pub fn level_nodes(&self, level: usize) -> FormatResult<&[TreeNode]> {
        let range = self.level_range(level)?;
        Ok(&self.nodes[range])
    }

    /// Level holding node `index`.
    pub fn level_of(&self, index: usize) -> FormatResult<usize> {
        if index >= self.nodes.len() {
            return Err(FormatError::OutOfRange {
                section: Section::TreeNodes,
                index,
                len: self.nodes.len(),
            });
        }
        Ok(self.level_starts[1..].partition_point(|s| s.0 as usize <= index))
    }

    /// Node indices of the children of interior node `index`.
    ///
    /// Leaves have no child nodes; asking for them is `OutOfRange` on the
    /// level-starts section.
    pub fn child_range(&self, index: usize) -> FormatResult<Range<usize>> {
        let level = self.level_of(index)?;
        let children = self.level_range(level + 1)?;
        let offset = index - self.level_starts[level].0 as usize;
        let first = children
            .start
            .saturating_add(offset.saturating_mul(BRANCHING_FACTOR))
            .min(children.end);
        Ok(first..first.saturating_add(BRANCHING_FACTOR).min(children.end))
    }

    /// Segment record indices addressed by leaf node `index`, clipped to a
    /// table of `segment_count` records.
    pub fn leaf_segment_range(&self, index: usize, segment_count: usize) -> FormatResult<Range<usize>> {
        let level = self.level_of(index)?;
        if Some(level) != self.leaf_level() {
            return Err(FormatError::OutOfRange {
                section: Section::TreeLevelStarts,
                index: level,
                len: self.level_count(),
            });
        }
        let offset = index - self.level_starts[level].0 as usize;
        let first = offset.saturating_mul(LEAF_NODE_SIZE).min(segment_count);
        Ok(first..first.saturating_add(LEAF_NODE_SIZE).min(segment_count))
    }

    /// Rectangle covering the whole tree, [`RectangleInt2D::EMPTY`] when the
    /// tree has no nodes.
    pub fn bounds(&self) -> RectangleInt2D {
        self.level_nodes(0)
            .map(|root| {
                root.iter().fold(RectangleInt2D::EMPTY, |mut acc, n| {
                    acc.merge(&n.minimum_bounding_rectangle);
                    acc
                })
            })
            .unwrap_or(RectangleInt2D::EMPTY)
    }
}

fn check_level_starts(level_starts: &[TreeLevelStart], node_count: usize) -> FormatResult<()> {
    let Some(first) = level_starts.first() else {
        return Err(FormatError::InvalidLevelStarts { index: 0 });
    };
    if first.0 != 0 {
        return Err(FormatError::InvalidLevelStarts { index: 0 });
    }
    if let Some(i) = level_starts.windows(2).position(|w| w[1] < w[0]) {
        return Err(FormatError::InvalidLevelStarts { index: i + 1 });
    }
    let last = level_starts.len() - 1;
    if level_starts[last].0 != node_count as u64 {
        return Err(FormatError::InvalidLevelStarts { index: last });
    }
    Ok(())
}
