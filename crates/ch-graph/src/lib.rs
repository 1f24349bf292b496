//! `ch-graph` — compressed sparse row store for contracted routing graphs.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`entry`]    | `NodeArrayEntry`, `EdgeArrayEntry`, `EdgeData`, edge codec  |
//! | [`graph`]    | `GraphView` (load, adjacency, encode), `Direction`          |
//! | [`filter`]   | `EdgeFilter` per-edge inclusion bits                        |
//! | [`validate`] | `GraphReport`, `GraphViolation`, the validation pass        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Validates nodes on the Rayon thread pool.                 |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public record types. |

pub mod entry;
pub mod filter;
pub mod graph;
pub mod validate;


pub use entry::{EdgeArrayEntry, EdgeData, NodeArrayEntry, decode_edge, encode_edge};
pub use filter::EdgeFilter;
pub use graph::{Direction, GraphView};
pub use validate::{GraphReport, GraphViolation};
