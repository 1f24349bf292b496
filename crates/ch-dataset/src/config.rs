//! Dataset location and loading options.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where a dataset lives and how strictly to open it.
///
/// Typically loaded from a TOML/JSON file by the application crate (with the
/// `serde` feature) or derived from a base path with
/// [`DatasetConfig::from_base`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DatasetConfig {
    /// Tar archive holding the contracted graph and its edge filter.
    pub graph: PathBuf,

    /// Tar archive holding the static R-tree.
    pub spatial: PathBuf,

    /// Tar archive holding the node coordinates.
    pub coordinates: PathBuf,

    /// Flat segment table file (memory-mapped).
    pub segments: PathBuf,

    /// Tar archive holding the polyline geometry weights.  Not loaded when
    /// `None`.  Default: `None`.
    pub geometry: Option<PathBuf>,

    /// Run the full graph validation pass and refuse an inconsistent graph.
    /// Default: `true`.
    pub validate_graph: bool,

    /// Attach the first exclusion class's edge filter.  The archive must
    /// then contain it.  Default: `false`.
    pub edge_filter: bool,
}

impl DatasetConfig {
    /// Paths for the files written next to each other under one base name:
    ///
    /// | Field         | Path                  |
    /// |---------------|-----------------------|
    /// | `graph`       | `<base>.hsgr`         |
    /// | `spatial`     | `<base>.ramIndex`     |
    /// | `coordinates` | `<base>.nbg_nodes`    |
    /// | `segments`    | `<base>.fileIndex`    |
    ///
    /// `geometry` stays `None`; see [`DatasetConfig::with_geometry`].
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            graph: with_suffix(base, ".hsgr"),
            spatial: with_suffix(base, ".ramIndex"),
            coordinates: with_suffix(base, ".nbg_nodes"),
            segments: with_suffix(base, ".fileIndex"),
            ..Self::default()
        }
    }

    /// Also load the geometry archive `<base>.geometry`.
    pub fn with_geometry(mut self, base: impl AsRef<Path>) -> Self {
        self.geometry = Some(with_suffix(base.as_ref(), ".geometry"));
        self
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            graph: PathBuf::new(),
            spatial: PathBuf::new(),
            coordinates: PathBuf::new(),
            segments: PathBuf::new(),
            geometry: None,
            validate_graph: true,
            edge_filter: false,
        }
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
