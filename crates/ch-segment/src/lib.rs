//! `ch-segment` — edge-based segment lookup table and polyline geometry.
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`segment`]  | `SegmentId` packing, `EdgeBasedNodeSegment` record           |
//! | [`table`]    | `SegmentTable` (load, lookup, encode)                        |
//! | [`packed`]   | `PackedWeights`, 22-bit weights in `u64` words               |
//! | [`geometry`] | `Geometry` offset index and per-segment weight runs          |
//!
//! A segment whose direction is disabled still decodes; consumers must treat
//! it as "no edge in this direction".

pub mod geometry;
pub mod packed;
pub mod segment;
pub mod table;


pub use geometry::{Geometry, GeometryOffset};
pub use packed::{PackedWeights, WEIGHT_BITS, WEIGHT_MAX};
pub use segment::{EdgeBasedNodeSegment, SegmentId, decode_segment_id, encode_segment_id};
pub use table::SegmentTable;
