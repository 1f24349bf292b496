//! Tar archive reader.
//!
//! # Member layout
//!
//! Each array lives in two members: the raw record payload, without a
//! header, and a sidecar named `<member>.meta` holding the 8-byte
//! [`Metadata`].  The sidecar's count is authoritative; a payload that does
//! not hold exactly that many records is rejected.
//!
//! ```text
//! ch/metrics/duration/contracted_graph/node_array        NodeArrayEntry × n
//! ch/metrics/duration/contracted_graph/node_array.meta   u64 n
//! ```
//!
//! Member names are compared after stripping a leading `/` or `./`, so
//! archives written with absolute member names open the same way as
//! relative ones.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;
use rustc_hash::FxHashMap;

use ch_core::{Metadata, Record, Section, decode_payload};
use ch_graph::EdgeFilter;
use ch_segment::PackedWeights;

use crate::error::{DatasetError, DatasetResult};

// ── Well-known members ────────────────────────────────────────────────────────

/// CSR row offsets of the contracted graph, sentinel included.
pub const NODE_ARRAY: &str = "ch/metrics/duration/contracted_graph/node_array";
/// Packed edge records of the contracted graph.
pub const EDGE_ARRAY: &str = "ch/metrics/duration/contracted_graph/edge_array";
/// Inclusion bits of the first exclusion class.
pub const EDGE_FILTER: &str = "ch/metrics/duration/exclude/0/edge_filter";
/// Static R-tree node rectangles.
pub const TREE_NODES: &str = "common/rtree/search_data";
/// Static R-tree level starts.
pub const TREE_LEVEL_STARTS: &str = "common/rtree/search_tree_level_starts";
/// Node-based graph coordinates.
pub const COORDINATES: &str = "common/nbn_data/coordinates";
/// Geometry offsets into the weight vectors, sentinel included.
pub const GEOMETRY_INDEX: &str = "common/segment_data/index";
/// Packed per-segment weights in forward direction.
pub const FORWARD_WEIGHTS: &str = "common/segment_data/forward_weights";
/// Packed per-segment weights in reverse direction.
pub const REVERSE_WEIGHTS: &str = "common/segment_data/reverse_weights";

/// Suffix of a member's [`Metadata`] sidecar.
pub const META_SUFFIX: &str = ".meta";

// ── Archive ───────────────────────────────────────────────────────────────────

/// Every regular-file member of one tar archive, held in memory.
#[derive(Debug)]
pub struct Archive {
    source: PathBuf,
    members: FxHashMap<String, Vec<u8>>,
}

impl Archive {
    /// Read the archive at `path`.
    pub fn open(path: &Path) -> DatasetResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(path, BufReader::new(file))
    }

    /// Read an archive from any source.  `source` names it in errors.
    ///
    /// Useful for testing (pass a `std::io::Cursor`).
    pub fn from_reader<R: Read>(source: impl Into<PathBuf>, reader: R) -> DatasetResult<Self> {
        let source = source.into();
        let mut archive = tar::Archive::new(reader);
        let mut members = FxHashMap::default();
        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = normalize(&entry.path()?);
            let mut buf = Vec::with_capacity(member_capacity(entry.size()));
            entry.read_to_end(&mut buf)?;
            members.insert(name, buf);
        }
        debug!("{}: {} members", source.display(), members.len());
        Ok(Self { source, members })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains_key(normalize(Path::new(member)).as_str())
    }

    /// Member names in ascending order.
    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Raw bytes of `member`.
    pub fn member(&self, member: &str) -> DatasetResult<&[u8]> {
        self.members
            .get(normalize(Path::new(member)).as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::MissingMember {
                archive: self.source.clone(),
                member: member.to_owned(),
            })
    }

    /// The [`Metadata`] sidecar of `member`.
    pub fn metadata(&self, member: &str, section: Section) -> DatasetResult<Metadata> {
        let bytes = self.member(&format!("{member}{META_SUFFIX}"))?;
        Ok(Metadata::decode(section, bytes)?)
    }

    /// Decode the record array stored in `member`.
    pub fn read_array<T: Record>(&self, member: &str) -> DatasetResult<Vec<T>> {
        let metadata = self.metadata(member, T::SECTION)?;
        let payload = self.member(member)?;
        let records = decode_payload::<T>(metadata.element_count, payload)?;
        debug!(
            "{}: {} {} records from {member}",
            self.source.display(),
            records.len(),
            T::SECTION
        );
        Ok(records)
    }

    /// Decode the bit array stored in `member`.  The payload may carry
    /// padding past the declared bit count.
    pub fn read_edge_filter(&self, member: &str) -> DatasetResult<EdgeFilter> {
        let metadata = self.metadata(member, Section::EdgeFilter)?;
        let payload = self.member(member)?;
        Ok(EdgeFilter::from_bytes(metadata.element_count, payload.to_vec())?)
    }

    /// Decode the 22-bit packed weights stored in `member`.  The sidecar
    /// counts weights, not words.
    pub fn read_packed_weights(&self, member: &str) -> DatasetResult<PackedWeights> {
        let metadata = self.metadata(member, Section::GeometryWeights)?;
        let payload = self.member(member)?;
        Ok(PackedWeights::from_bytes(metadata.element_count, payload)?)
    }
}

/// Initial buffer size for a member.  The header size is untrusted, so the
/// reserve is capped and `read_to_end` grows past it as bytes arrive.
fn member_capacity(declared: u64) -> usize {
    const MAX_RESERVE: usize = 1 << 20;
    usize::try_from(declared).map_or(MAX_RESERVE, |size| size.min(MAX_RESERVE))
}

fn normalize(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    let mut name: &str = &lossy;
    loop {
        if let Some(rest) = name.strip_prefix('/') {
            name = rest;
        } else if let Some(rest) = name.strip_prefix("./") {
            name = rest;
        } else {
            break;
        }
    }
    name.to_owned()
}
