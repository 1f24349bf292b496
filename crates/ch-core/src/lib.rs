//! `ch-core` — foundational types for the `ch_store` storage format.
//!
//! Every other `ch-*` crate depends on this one.  It holds the fixed-width
//! scalar types shared by all sections, the little-endian section codec, and
//! the single [`FormatError`] type every loader reports through.
//!
//! # What lives here
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`ids`]        | `NodeId`, `EdgeId`, `Weight`                             |
//! | [`coord`]      | `FixedLongitude`, `FixedLatitude`, `Coordinate`, scale   |
//! | [`bits`]       | Shift/mask pack and unpack of 31+1 and 30+1+1 bit words  |
//! | [`metadata`]   | `Metadata` section header, `read_metadata`/`write_metadata` |
//! | [`codec`]      | `Record` trait, `SectionReader`, `write_section`         |
//! | [`error`]      | `FormatError`, `FormatResult`, `Section`                 |
//!
//! # Byte order
//!
//! Every integer in every section is little-endian, independent of the host.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public scalar types. |

pub mod bits;
pub mod codec;
pub mod coord;
pub mod error;
pub mod ids;
pub mod metadata;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use codec::{Record, SectionReader, decode_payload, write_records, write_section};
pub use coord::{
    COORDINATE_PRECISION, Coordinate, FixedLatitude, FixedLongitude, FloatCoordinate,
    FloatLatitude, FloatLongitude, squared_euclidean_distance,
};
pub use error::{FormatError, FormatResult, Section};
pub use ids::{EdgeId, NodeId, Weight};
pub use metadata::{Metadata, read_metadata, write_metadata};
