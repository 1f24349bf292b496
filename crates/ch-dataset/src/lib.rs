//! `ch-dataset` — opens a complete routing dataset from disk.
//!
//! The format crates decode byte slices; this crate finds those bytes.
//! Array sections come from tar archives (payload member plus `.meta`
//! sidecar), the segment table from a flat file mapped with `memmap2`.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`archive`] | `Archive` tar reader, well-known member names             |
//! | [`mmap`]    | `MappedFile` read-only mapping of a flat section file     |
//! | [`config`]  | `DatasetConfig` paths and options                         |
//! | [`dataset`] | `Dataset::open`, per-part loaders                         |
//! | [`error`]   | `DatasetError`, `DatasetResult`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Validates the graph on the Rayon thread pool.           |
//! | `serde`    | `Serialize`/`Deserialize` on `DatasetConfig` and records. |
//!
//! No logger is installed; records are emitted through the `log` facade.

pub mod archive;
pub mod config;
pub mod dataset;
pub mod error;
pub mod mmap;


pub use archive::Archive;
pub use config::DatasetConfig;
pub use dataset::{Dataset, load_geometry, load_graph, load_rtree};
pub use error::{DatasetError, DatasetResult};
pub use mmap::MappedFile;
