//! Read-only contracted graph in CSR form.
//!
//! # Data layout
//!
//! Given a `NodeId n`, its edges occupy the slice:
//!
//! ```text
//! edges[ nodes[n].first_edge .. nodes[n+1].first_edge ]
//! ```
//!
//! `nodes` therefore holds `node_count + 1` entries; the last one is a
//! sentinel equal to the edge count.
//!
//! # Flat byte layout
//!
//! ```text
//! [ u64 node_count ][ NodeArrayEntry × (node_count + 1) ]
//! [ u64 edge_count ][ EdgeArrayEntry × edge_count ]
//! ```
//!
//! Note the node header counts real nodes only; the sentinel is implied.
//!
//! A `GraphView` is immutable once constructed and is `Send + Sync`, so one
//! instance can be shared by every query thread without locking.

use std::io::{self, Write};
use std::ops::{Not, Range};

use log::debug;

use ch_core::codec::write_records;
use ch_core::{
    EdgeId, FormatError, FormatResult, NodeId, Record, Section, SectionReader, read_metadata,
    write_metadata, write_section,
};

use crate::entry::{EdgeArrayEntry, EdgeData, NodeArrayEntry, decode_edge};
use crate::filter::EdgeFilter;

// ── Direction ─────────────────────────────────────────────────────────────────

/// Search direction used to select edges by their `forward`/`backward` flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

impl Not for Direction {
    type Output = Direction;

    fn not(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

// ── GraphView ─────────────────────────────────────────────────────────────────

/// A loaded CSR graph: node offset table, packed edge array and an optional
/// inclusion filter.
#[derive(Clone, Debug)]
pub struct GraphView {
    nodes: Vec<NodeArrayEntry>,
    edges: Vec<EdgeArrayEntry>,
    filter: Option<EdgeFilter>,
}

impl GraphView {
    /// Wrap already decoded arrays.  `nodes` must contain the sentinel.
    ///
    /// Offsets are not checked here; run [`validate`](Self::validate) (or use
    /// [`load_validated`](Self::load_validated)) when the source is not
    /// trusted.  Accessors never panic on inconsistent offsets either way.
    pub fn from_parts(nodes: Vec<NodeArrayEntry>, edges: Vec<EdgeArrayEntry>) -> FormatResult<Self> {
        if nodes.is_empty() {
            return Err(FormatError::SizeMismatch {
                section: Section::NodeArray,
                offset: 0,
                expected: NodeArrayEntry::SIZE,
                actual: 0,
            });
        }
        Ok(Self { nodes, edges, filter: None })
    }

    /// Decode the flat layout, failing on the first structural error.
    ///
    /// # Errors
    ///
    /// - [`FormatError::TruncatedInput`] if either section declares more
    ///   records than the input holds.
    /// - [`FormatError::SizeMismatch`] if bytes remain after the edge array.
    pub fn load(bytes: &[u8]) -> FormatResult<Self> {
        let mut reader = SectionReader::new(bytes);

        let node_count = read_metadata(&mut reader, Section::NodeArray)?;
        let nodes = reader.read_records::<NodeArrayEntry>(node_count.saturating_add(1))?;
        let edges = reader.read_section::<EdgeArrayEntry>()?;
        reader.finish(Section::EdgeArray)?;

        debug!(
            "loaded graph: {} nodes, {} edges ({} bytes)",
            node_count,
            edges.len(),
            bytes.len()
        );
        Self::from_parts(nodes, edges)
    }

    /// [`load`](Self::load) followed by the diagnostic validation pass.
    ///
    /// Fails with [`FormatError::InconsistentGraph`] if any violation is
    /// found; call [`validate`](Self::validate) on an unvalidated view to
    /// get the full report.
    pub fn load_validated(bytes: &[u8]) -> FormatResult<Self> {
        let graph = Self::load(bytes)?;
        graph.validate().into_result()?;
        Ok(graph)
    }

    /// Attach an inclusion filter.  It must hold one bit per edge.
    pub fn with_edge_filter(mut self, filter: EdgeFilter) -> FormatResult<Self> {
        if filter.len() != self.edges.len() {
            return Err(FormatError::SizeMismatch {
                section: Section::EdgeFilter,
                offset: 0,
                expected: self.edges.len(),
                actual: filter.len(),
            });
        }
        self.filter = Some(filter);
        Ok(self)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The offset table, sentinel included.
    pub fn node_array(&self) -> &[NodeArrayEntry] {
        &self.nodes
    }

    pub fn edge_array(&self) -> &[EdgeArrayEntry] {
        &self.edges
    }

    pub fn edge_filter(&self) -> Option<&EdgeFilter> {
        self.filter.as_ref()
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Half-open edge index range of `node`.
    ///
    /// # Errors
    ///
    /// [`FormatError::OutOfRange`] if `node >= node_count`, or if the stored
    /// offsets do not describe a range inside the edge array.
    pub fn edge_range(&self, node: NodeId) -> FormatResult<Range<usize>> {
        let index = node.index();
        if index >= self.node_count() {
            return Err(FormatError::OutOfRange {
                section: Section::NodeArray,
                index,
                len: self.node_count(),
            });
        }
        let start = self.nodes[index].first_edge.index();
        let end = self.nodes[index + 1].first_edge.index();
        if start > end || end > self.edges.len() {
            return Err(FormatError::OutOfRange {
                section: Section::EdgeArray,
                index: end.max(start),
                len: self.edges.len(),
            });
        }
        Ok(start..end)
    }

    /// The packed edges of `node`: `edges[first_edge(n) .. first_edge(n+1)]`.
    pub fn edges_of(&self, node: NodeId) -> FormatResult<&[EdgeArrayEntry]> {
        let range = self.edge_range(node)?;
        Ok(&self.edges[range])
    }

    /// Number of stored edges of `node`, ignoring direction and filter.
    pub fn degree(&self, node: NodeId) -> FormatResult<usize> {
        self.edge_range(node).map(|r| r.len())
    }

    /// Decode a single edge by its position in the edge array.
    pub fn edge(&self, edge: EdgeId) -> FormatResult<EdgeData> {
        self.edges
            .get(edge.index())
            .map(decode_edge)
            .ok_or(FormatError::OutOfRange {
                section: Section::EdgeArray,
                index: edge.index(),
                len: self.edges.len(),
            })
    }

    /// Decoded edges of `node` usable in `direction`.
    ///
    /// Skips edges whose direction flag is unset and, when a filter is
    /// attached, edges the filter excludes.
    pub fn adjacent_edges(
        &self,
        node: NodeId,
        direction: Direction,
    ) -> FormatResult<impl Iterator<Item = (EdgeId, EdgeData)> + '_> {
        let range = self.edge_range(node)?;
        let start = range.start;
        Ok(self.edges[range]
            .iter()
            .enumerate()
            .map(move |(i, entry)| (start + i, entry))
            .filter(move |(i, _)| self.filter.as_ref().is_none_or(|f| f.includes(*i)))
            .filter(move |(_, entry)| match direction {
                Direction::Forward => entry.forward(),
                Direction::Backward => entry.backward(),
            })
            .map(|(i, entry)| (EdgeId(i as u32), decode_edge(entry))))
    }

    // ── Encoding ──────────────────────────────────────────────────────────

    /// Inverse of [`load`](Self::load).  The filter is not part of the flat
    /// graph layout; encode it separately with [`EdgeFilter::encode`].
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            16 + self.nodes.len() * NodeArrayEntry::SIZE + self.edges.len() * EdgeArrayEntry::SIZE,
        );
        write_metadata(&mut out, self.node_count() as u64);
        write_records(&mut out, &self.nodes);
        write_section(&mut out, &self.edges);
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }
}
