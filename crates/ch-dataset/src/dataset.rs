//! Opening a complete dataset.

use std::sync::Arc;

use log::info;

use ch_core::{Coordinate, FormatError, Section};
use ch_graph::{EdgeArrayEntry, GraphView, NodeArrayEntry};
use ch_segment::{Geometry, GeometryOffset, SegmentTable};
use ch_spatial::{StaticRTree, TreeLevelStart, TreeNode};

use crate::archive::{
    Archive, COORDINATES, EDGE_ARRAY, EDGE_FILTER, FORWARD_WEIGHTS, GEOMETRY_INDEX, NODE_ARRAY,
    REVERSE_WEIGHTS, TREE_LEVEL_STARTS, TREE_NODES,
};
use crate::config::DatasetConfig;
use crate::error::DatasetResult;
use crate::mmap::MappedFile;

/// Everything a query layer reads, decoded and checked.
///
/// Immutable after [`Dataset::open`]; wrap it in an [`Arc`] to share it
/// between reader threads.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub graph: GraphView,
    pub rtree: StaticRTree,
    pub coordinates: Vec<Coordinate>,
    pub segments: SegmentTable,
    /// Present when [`DatasetConfig::geometry`] names an archive.
    pub geometry: Option<Geometry>,
}

impl Dataset {
    /// Load and check every part named by `config`.
    ///
    /// Any malformed section aborts the whole open; no partially loaded
    /// dataset is ever returned.
    pub fn open(config: &DatasetConfig) -> DatasetResult<Self> {
        let graph = load_graph(&Archive::open(&config.graph)?, config)?;
        let rtree = load_rtree(&Archive::open(&config.spatial)?)?;
        let coordinates = Archive::open(&config.coordinates)?.read_array::<Coordinate>(COORDINATES)?;
        let segments = MappedFile::open(&config.segments)?.load(SegmentTable::load)?;
        check_segment_endpoints(&segments, coordinates.len())?;
        let geometry = match &config.geometry {
            Some(path) => Some(load_geometry(&Archive::open(path)?)?),
            None => None,
        };

        info!(
            "opened dataset: {} nodes, {} edges, {} tree nodes, {} coordinates, {} segments, {} geometries",
            graph.node_count(),
            graph.edge_count(),
            rtree.node_count(),
            coordinates.len(),
            segments.len(),
            geometry.as_ref().map_or(0, Geometry::geometry_count)
        );
        Ok(Self { graph, rtree, coordinates, segments, geometry })
    }

    /// [`Dataset::open`] wrapped for sharing.
    pub fn open_shared(config: &DatasetConfig) -> DatasetResult<Arc<Self>> {
        Self::open(config).map(Arc::new)
    }

    /// Coordinate of node-based node `index`.
    pub fn coordinate(&self, index: usize) -> DatasetResult<Coordinate> {
        self.coordinates.get(index).copied().ok_or_else(|| {
            FormatError::OutOfRange {
                section: Section::Coordinates,
                index,
                len: self.coordinates.len(),
            }
            .into()
        })
    }
}

/// Contracted graph from its archive.  The node array's `.meta` count
/// includes the sentinel.
pub fn load_graph(archive: &Archive, config: &DatasetConfig) -> DatasetResult<GraphView> {
    let nodes = archive.read_array::<NodeArrayEntry>(NODE_ARRAY)?;
    let edges = archive.read_array::<EdgeArrayEntry>(EDGE_ARRAY)?;
    let mut graph = GraphView::from_parts(nodes, edges)?;
    if config.validate_graph {
        graph.validate().into_result()?;
    }
    if config.edge_filter {
        graph = graph.with_edge_filter(archive.read_edge_filter(EDGE_FILTER)?)?;
    }
    Ok(graph)
}

/// Search tree from its archive.
pub fn load_rtree(archive: &Archive) -> DatasetResult<StaticRTree> {
    let nodes = archive.read_array::<TreeNode>(TREE_NODES)?;
    let level_starts = archive.read_array::<TreeLevelStart>(TREE_LEVEL_STARTS)?;
    Ok(StaticRTree::from_parts(nodes, level_starts)?)
}

/// Polyline geometry from its archive.
pub fn load_geometry(archive: &Archive) -> DatasetResult<Geometry> {
    let index = archive.read_array::<GeometryOffset>(GEOMETRY_INDEX)?;
    let forward = archive.read_packed_weights(FORWARD_WEIGHTS)?;
    let reverse = archive.read_packed_weights(REVERSE_WEIGHTS)?;
    Ok(Geometry::from_parts(index, forward, reverse)?)
}

/// Every segment endpoint must have a coordinate.
fn check_segment_endpoints(segments: &SegmentTable, coordinate_count: usize) -> DatasetResult<()> {
    let missing = segments
        .iter()
        .flat_map(|s| [s.u, s.v])
        .find(|node| node.index() >= coordinate_count);
    match missing {
        Some(node) => Err(FormatError::OutOfRange {
            section: Section::Coordinates,
            index: node.index(),
            len: coordinate_count,
        }
        .into()),
        None => Ok(()),
    }
}
