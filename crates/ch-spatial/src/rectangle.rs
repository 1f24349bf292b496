//! Fixed-point bounding rectangle.

use ch_core::codec::{fixed, le4};
use ch_core::{
    Coordinate, FixedLatitude, FixedLongitude, FormatResult, Record, Section,
    squared_euclidean_distance,
};

/// Axis-aligned rectangle in fixed-point degrees.
///
/// On disk: `min_lon`, `max_lon`, `min_lat`, `max_lat`, each an `i32`
/// (16 bytes).  The default value is [`RectangleInt2D::EMPTY`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectangleInt2D {
    pub min_lon: FixedLongitude,
    pub max_lon: FixedLongitude,
    pub min_lat: FixedLatitude,
    pub max_lat: FixedLatitude,
}

impl RectangleInt2D {
    /// The rectangle containing nothing: every minimum at `i32::MAX`, every
    /// maximum at `i32::MIN`.  Merging anything into it yields that thing.
    pub const EMPTY: RectangleInt2D = RectangleInt2D {
        min_lon: FixedLongitude(i32::MAX),
        max_lon: FixedLongitude(i32::MIN),
        min_lat: FixedLatitude(i32::MAX),
        max_lat: FixedLatitude(i32::MIN),
    };

    pub fn new(min_lon: i32, max_lon: i32, min_lat: i32, max_lat: i32) -> Self {
        Self {
            min_lon: FixedLongitude(min_lon),
            max_lon: FixedLongitude(max_lon),
            min_lat: FixedLatitude(min_lat),
            max_lat: FixedLatitude(max_lat),
        }
    }

    /// Degenerate rectangle covering one point.
    pub fn from_point(c: Coordinate) -> Self {
        Self {
            min_lon: c.longitude,
            max_lon: c.longitude,
            min_lat: c.latitude,
            max_lat: c.latitude,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// `min <= max` on both axes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_lon <= self.max_lon && self.min_lat <= self.max_lat
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lon..=self.max_lon).contains(&c.longitude)
            && (self.min_lat..=self.max_lat).contains(&c.latitude)
    }

    /// Grow `self` to cover `other`.
    pub fn merge(&mut self, other: &RectangleInt2D) {
        self.min_lon = self.min_lon.min(other.min_lon);
        self.max_lon = self.max_lon.max(other.max_lon);
        self.min_lat = self.min_lat.min(other.min_lat);
        self.max_lat = self.max_lat.max(other.max_lat);
    }

    /// Squared euclidean distance from `c` to the nearest point of the
    /// rectangle, `0` if `c` is inside.
    ///
    /// Lower bound used by nearest-neighbour searches over the tree.  An
    /// empty or inverted rectangle is infinitely far away (`u64::MAX`).
    pub fn min_squared_distance(&self, c: &Coordinate) -> u64 {
        if !self.is_valid() {
            return u64::MAX;
        }
        let nearest = Coordinate {
            longitude: c.longitude.max(self.min_lon).min(self.max_lon),
            latitude: c.latitude.max(self.min_lat).min(self.max_lat),
        };
        squared_euclidean_distance(c, &nearest)
    }
}

impl Default for RectangleInt2D {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Record for RectangleInt2D {
    const SECTION: Section = Section::TreeNodes;
    const SIZE: usize = 16;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 16] = fixed(Self::SECTION, bytes)?;
        Ok(Self::new(
            i32::from_le_bytes(le4(&b, 0)),
            i32::from_le_bytes(le4(&b, 4)),
            i32::from_le_bytes(le4(&b, 8)),
            i32::from_le_bytes(le4(&b, 12)),
        ))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.min_lon.0.to_le_bytes());
        out.extend_from_slice(&self.max_lon.0.to_le_bytes());
        out.extend_from_slice(&self.min_lat.0.to_le_bytes());
        out.extend_from_slice(&self.max_lat.0.to_le_bytes());
    }
}
