//! Fixed-point coordinate types.
//!
//! Longitudes and latitudes are stored as signed 32-bit integers holding
//! degrees multiplied by [`COORDINATE_PRECISION`].  At 1e6 one unit is a
//! micro-degree (~11 cm at the equator) and the full ±180° range fits with
//! room to spare.
//!
//! The float types exist only to move values across the scale boundary;
//! projection (web mercator and friends) belongs to the consumer.

use crate::codec::{Record, fixed, le4};
use crate::error::{FormatResult, Section};

/// Degrees → fixed-point scale factor shared by every coordinate field.
///
/// Must match the value used by the pipeline that produced the dataset.
pub const COORDINATE_PRECISION: f64 = 1e6;

/// Fixed-point longitude (degrees × [`COORDINATE_PRECISION`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedLongitude(pub i32);

/// Fixed-point latitude (degrees × [`COORDINATE_PRECISION`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedLatitude(pub i32);

/// Longitude in floating-point degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatLongitude(pub f64);

/// Latitude in floating-point degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatLatitude(pub f64);

macro_rules! impl_scale {
    ($fixed:ident, $float:ident) => {
        impl From<$float> for $fixed {
            /// Rounds to the nearest fixed-point unit.
            fn from(other: $float) -> $fixed {
                $fixed((other.0 * COORDINATE_PRECISION).round() as i32)
            }
        }

        impl From<$fixed> for $float {
            fn from(other: $fixed) -> $float {
                $float(f64::from(other.0) / COORDINATE_PRECISION)
            }
        }
    };
}

impl_scale!(FixedLongitude, FloatLongitude);
impl_scale!(FixedLatitude, FloatLatitude);

/// A fixed-point point: the point form of a bounding rectangle's bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub longitude: FixedLongitude,
    pub latitude: FixedLatitude,
}

impl Coordinate {
    #[inline]
    pub fn new(longitude: i32, latitude: i32) -> Self {
        Self {
            longitude: FixedLongitude(longitude),
            latitude: FixedLatitude(latitude),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let float = FloatCoordinate::from(*self);
        write!(f, "({:.6}, {:.6})", float.longitude.0, float.latitude.0)
    }
}

/// On disk: `i32 longitude`, `i32 latitude` (8 bytes).
impl Record for Coordinate {
    const SECTION: Section = Section::Coordinates;
    const SIZE: usize = 8;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 8] = fixed(Self::SECTION, bytes)?;
        Ok(Coordinate::new(
            i32::from_le_bytes(le4(&b, 0)),
            i32::from_le_bytes(le4(&b, 4)),
        ))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.longitude.0.to_le_bytes());
        out.extend_from_slice(&self.latitude.0.to_le_bytes());
    }
}

/// A coordinate in floating-point degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatCoordinate {
    pub longitude: FloatLongitude,
    pub latitude: FloatLatitude,
}

impl From<Coordinate> for FloatCoordinate {
    fn from(other: Coordinate) -> FloatCoordinate {
        FloatCoordinate {
            longitude: other.longitude.into(),
            latitude: other.latitude.into(),
        }
    }
}

impl From<FloatCoordinate> for Coordinate {
    fn from(other: FloatCoordinate) -> Coordinate {
        Coordinate {
            longitude: other.longitude.into(),
            latitude: other.latitude.into(),
        }
    }
}

/// Squared euclidean distance in fixed-point units.
///
/// Treats the two axes as a flat plane.  Deltas are taken in `i64`; the sum
/// saturates at `u64::MAX` for points at opposite corners of the `i32` range.
pub fn squared_euclidean_distance(lhs: &Coordinate, rhs: &Coordinate) -> u64 {
    let d_lon = i64::from(lhs.longitude.0) - i64::from(rhs.longitude.0);
    let d_lat = i64::from(lhs.latitude.0) - i64::from(rhs.latitude.0);
    d_lon
        .unsigned_abs()
        .pow(2)
        .saturating_add(d_lat.unsigned_abs().pow(2))
}
