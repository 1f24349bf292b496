//! Diagnostic validation pass.
//!
//! Unlike loading, validation never stops at the first problem: it checks
//! every node and collects all violations keyed by node index, so a
//! preprocessing tool can report everything wrong with a graph in one run.
//!
//! With the `parallel` feature nodes are checked on the Rayon pool.

use std::fmt;

use log::warn;
use rustc_hash::FxHashMap;

use ch_core::{EdgeId, FormatError, FormatResult, NodeId};

use crate::graph::GraphView;

/// One structural problem found at a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphViolation {
    /// An edge of this node points past the last node.
    TargetOutOfRange { edge: EdgeId, target: NodeId },
    /// The next node's first edge lies before this node's.
    OffsetDecreasing { first_edge: EdgeId, next_first_edge: EdgeId },
    /// This node's first edge lies past the end of the edge array.
    OffsetPastEnd { first_edge: EdgeId, edge_count: usize },
    /// Node 0 does not start at edge 0, leaving edges owned by no node.
    LeadingGap { first_edge: EdgeId },
    /// The sentinel entry does not equal the edge count.
    SentinelMismatch { sentinel: EdgeId, edge_count: usize },
}

impl fmt::Display for GraphViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetOutOfRange { edge, target } => {
                write!(f, "{edge} targets {target}, which does not exist")
            }
            Self::OffsetDecreasing { first_edge, next_first_edge } => {
                write!(f, "offset {} is followed by smaller offset {}", first_edge.0, next_first_edge.0)
            }
            Self::OffsetPastEnd { first_edge, edge_count } => {
                write!(f, "offset {} is past the end of {edge_count} edges", first_edge.0)
            }
            Self::LeadingGap { first_edge } => {
                write!(f, "first node starts at edge {} instead of 0", first_edge.0)
            }
            Self::SentinelMismatch { sentinel, edge_count } => {
                write!(f, "sentinel offset {} does not equal edge count {edge_count}", sentinel.0)
            }
        }
    }
}

/// All violations found in a graph, keyed by node index.
///
/// Sentinel problems are keyed by the sentinel's index (`node_count`).
#[derive(Clone, Debug, Default)]
pub struct GraphReport {
    violations: FxHashMap<usize, Vec<GraphViolation>>,
}

impl GraphReport {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of nodes with at least one violation.
    pub fn node_count(&self) -> usize {
        self.violations.len()
    }

    /// Total number of violations.
    pub fn violation_count(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    pub fn get(&self, node: usize) -> &[GraphViolation] {
        self.violations.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Violations in ascending node order, for stable reporting.
    pub fn sorted(&self) -> Vec<(usize, &[GraphViolation])> {
        let mut entries: Vec<_> = self
            .violations
            .iter()
            .map(|(&node, v)| (node, v.as_slice()))
            .collect();
        entries.sort_unstable_by_key(|(node, _)| *node);
        entries
    }

    /// `Ok(())` if clean, otherwise [`FormatError::InconsistentGraph`].
    pub fn into_result(self) -> FormatResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        warn!(
            "graph validation found {} violations on {} nodes",
            self.violation_count(),
            self.node_count()
        );
        Err(FormatError::InconsistentGraph {
            nodes: self.node_count(),
            violations: self.violation_count(),
        })
    }
}

impl GraphView {
    /// Check every node and collect all violations.
    ///
    /// Checks: offsets non-decreasing and inside the edge array, node 0
    /// starting at edge 0, sentinel equal to the edge count, and every edge
    /// target below `node_count`.  Targets are checked only for nodes whose
    /// own range is well formed.
    pub fn validate(&self) -> GraphReport {
        let node_count = self.node_count();

        #[cfg(feature = "parallel")]
        let mut found: Vec<(usize, Vec<GraphViolation>)> = {
            use rayon::prelude::*;
            (0..node_count)
                .into_par_iter()
                .map(|n| (n, self.check_node(n)))
                .filter(|(_, v)| !v.is_empty())
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let mut found: Vec<(usize, Vec<GraphViolation>)> = (0..node_count)
            .map(|n| (n, self.check_node(n)))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let nodes = self.node_array();
        let sentinel = nodes[node_count].first_edge;
        if sentinel.index() != self.edge_count() {
            found.push((
                node_count,
                vec![GraphViolation::SentinelMismatch { sentinel, edge_count: self.edge_count() }],
            ));
        }

        let mut report = GraphReport::default();
        for (node, violations) in found {
            report.violations.entry(node).or_default().extend(violations);
        }
        report
    }

    fn check_node(&self, n: usize) -> Vec<GraphViolation> {
        let nodes = self.node_array();
        let edges = self.edge_array();
        let node_count = self.node_count();
        let first_edge = nodes[n].first_edge;
        let next_first_edge = nodes[n + 1].first_edge;

        let mut violations = Vec::new();
        if n == 0 && first_edge.0 != 0 {
            violations.push(GraphViolation::LeadingGap { first_edge });
        }
        if first_edge.index() > edges.len() {
            violations.push(GraphViolation::OffsetPastEnd { first_edge, edge_count: edges.len() });
        }
        if next_first_edge < first_edge {
            violations.push(GraphViolation::OffsetDecreasing { first_edge, next_first_edge });
        }
        let range_ok = first_edge <= next_first_edge && first_edge.index() <= edges.len();
        if range_ok {
            let end = next_first_edge.index().min(edges.len());
            for (edge, entry) in (first_edge.index()..end).zip(&edges[first_edge.index()..end]) {
                if entry.target.index() >= node_count {
                    violations.push(GraphViolation::TargetOutOfRange {
                        edge: EdgeId(edge as u32),
                        target: entry.target,
                    });
                }
            }
        }
        violations
    }
}
