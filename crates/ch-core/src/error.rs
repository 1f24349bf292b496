//! Format error type shared by every section loader.
//!
//! Loaders fail fast: the first structural problem aborts the whole section
//! and is reported with the section name and the byte offset where decoding
//! stopped.  No partially decoded array is ever returned alongside an error.

use std::fmt;

use thiserror::Error;

/// Names the section an error was raised in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Section {
    NodeArray,
    EdgeArray,
    EdgeFilter,
    TreeNodes,
    TreeLevelStarts,
    Coordinates,
    Segments,
    GeometryIndex,
    GeometryWeights,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::NodeArray => "node array",
            Section::EdgeArray => "edge array",
            Section::EdgeFilter => "edge filter",
            Section::TreeNodes => "tree nodes",
            Section::TreeLevelStarts => "tree level starts",
            Section::Coordinates => "coordinates",
            Section::Segments => "segments",
            Section::GeometryIndex => "geometry index",
            Section::GeometryWeights => "geometry weights",
        })
    }
}

/// Errors produced while decoding, encoding, or indexing a section.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The section declares more bytes than the input holds.
    #[error("{section}: truncated at byte {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        section: Section,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A byte range does not match the fixed record stride.
    #[error("{section}: size mismatch at byte {offset}: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        section: Section,
        offset: usize,
        expected: usize,
        actual: usize,
    },

    /// A logical value does not fit its bit-packed field.
    #[error("field `{field}` value {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: i64,
        bits: u32,
    },

    #[error("{section}: index {index} out of range (len {len})")]
    OutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },

    #[error("tree node {index} has an inverted bounding rectangle")]
    InvalidRectangle { index: usize },

    #[error("tree level start {index} breaks level ordering")]
    InvalidLevelStarts { index: usize },

    #[error("geometry offset {index} breaks offset ordering")]
    InvalidGeometryIndex { index: usize },

    #[error("segment {index} has identical endpoints")]
    DegenerateSegment { index: usize },

    #[error("segment {index} is enabled in neither direction")]
    NoDirection { index: usize },

    /// The diagnostic validation pass found violations.
    #[error("graph failed validation: {violations} violations on {nodes} nodes")]
    InconsistentGraph { nodes: usize, violations: usize },
}

/// Shorthand result type for all `ch-*` crates.
pub type FormatResult<T> = Result<T, FormatError>;
