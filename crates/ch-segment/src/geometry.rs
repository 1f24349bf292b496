//! Compressed polyline geometries.
//!
//! # Layout
//!
//! ```text
//! index            GeometryOffset × (g + 1)    u32 each, sentinel last
//! forward_weights  22-bit packed × index[g]
//! reverse_weights  22-bit packed × index[g]
//! ```
//!
//! Geometry `i` owns weights `index[i] .. index[i + 1]` of both vectors, one
//! per segment of its polyline.  [`EdgeBasedNodeSegment::fwd_segment_position`]
//! selects a segment within that run.
//!
//! [`EdgeBasedNodeSegment::fwd_segment_position`]: crate::EdgeBasedNodeSegment::fwd_segment_position

use std::ops::Range;

use log::debug;

use ch_core::codec::{fixed, le4};
use ch_core::{FormatError, FormatResult, Record, Section};

use crate::packed::PackedWeights;

/// Start of one geometry's weight run (4 bytes).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryOffset(pub u32);

impl Record for GeometryOffset {
    const SECTION: Section = Section::GeometryIndex;
    const SIZE: usize = 4;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 4] = fixed(Self::SECTION, bytes)?;
        Ok(Self(u32::from_le_bytes(le4(&b, 0))))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_le_bytes());
    }
}

/// Per-segment forward and reverse weights of every geometry.
#[derive(Clone, Debug)]
pub struct Geometry {
    index: Vec<GeometryOffset>,
    forward_weights: PackedWeights,
    reverse_weights: PackedWeights,
}

impl Geometry {
    /// Validate and wrap decoded parts.
    ///
    /// # Errors
    ///
    /// - [`FormatError::InvalidGeometryIndex`] when the index is empty, does
    ///   not start at 0 or decreases.
    /// - [`FormatError::SizeMismatch`] when either weight vector's length
    ///   differs from the sentinel offset.
    pub fn from_parts(
        index: Vec<GeometryOffset>,
        forward_weights: PackedWeights,
        reverse_weights: PackedWeights,
    ) -> FormatResult<Self> {
        match index.first() {
            Some(GeometryOffset(0)) => {}
            _ => return Err(FormatError::InvalidGeometryIndex { index: 0 }),
        }
        if let Some(i) = index.windows(2).position(|w| w[1] < w[0]) {
            return Err(FormatError::InvalidGeometryIndex { index: i + 1 });
        }
        let total = index.last().map_or(0, |last| last.0 as usize);
        for weights in [&forward_weights, &reverse_weights] {
            if weights.len() != total {
                return Err(FormatError::SizeMismatch {
                    section: Section::GeometryWeights,
                    offset: 0,
                    expected: total,
                    actual: weights.len(),
                });
            }
        }
        debug!("geometry: {} polylines, {total} segments", index.len() - 1);
        Ok(Self { index, forward_weights, reverse_weights })
    }

    /// Build from `(forward, reverse)` weight runs, one pair per geometry.
    ///
    /// # Errors
    ///
    /// - [`FormatError::SizeMismatch`] when a pair's runs differ in length.
    /// - [`FormatError::FieldOverflow`] for a weight above
    ///   [`WEIGHT_MAX`](crate::WEIGHT_MAX) or more segments than a `u32`
    ///   offset addresses.
    pub fn from_runs(runs: &[(Vec<u32>, Vec<u32>)]) -> FormatResult<Self> {
        let mut index = Vec::with_capacity(runs.len() + 1);
        let mut forward = Vec::new();
        let mut reverse = Vec::new();
        index.push(GeometryOffset(0));
        for (fwd, rev) in runs {
            if fwd.len() != rev.len() {
                return Err(FormatError::SizeMismatch {
                    section: Section::GeometryWeights,
                    offset: forward.len(),
                    expected: fwd.len(),
                    actual: rev.len(),
                });
            }
            forward.extend_from_slice(fwd);
            reverse.extend_from_slice(rev);
            let offset = u32::try_from(forward.len()).map_err(|_| FormatError::FieldOverflow {
                field: "geometry_offset",
                value: forward.len() as i64,
                bits: 32,
            })?;
            index.push(GeometryOffset(offset));
        }
        Self::from_parts(
            index,
            PackedWeights::from_values("forward_weight", &forward)?,
            PackedWeights::from_values("reverse_weight", &reverse)?,
        )
    }

    /// Number of geometries (the sentinel is not one).
    pub fn geometry_count(&self) -> usize {
        self.index.len() - 1
    }

    /// Total segments over all geometries.
    pub fn segment_count(&self) -> usize {
        self.forward_weights.len()
    }

    pub fn index(&self) -> &[GeometryOffset] {
        &self.index
    }

    pub fn forward(&self) -> &PackedWeights {
        &self.forward_weights
    }

    pub fn reverse(&self) -> &PackedWeights {
        &self.reverse_weights
    }

    /// Weight positions owned by `geometry_id`.
    pub fn range(&self, geometry_id: usize) -> FormatResult<Range<usize>> {
        if geometry_id >= self.geometry_count() {
            return Err(FormatError::OutOfRange {
                section: Section::GeometryIndex,
                index: geometry_id,
                len: self.geometry_count(),
            });
        }
        Ok(self.index[geometry_id].0 as usize..self.index[geometry_id + 1].0 as usize)
    }

    pub fn forward_weights(&self, geometry_id: usize) -> FormatResult<Vec<u32>> {
        let range = self.range(geometry_id)?;
        Ok(self.forward_weights.range(range).collect())
    }

    /// Reverse weights of `geometry_id`, in the same segment order as the
    /// forward ones.
    pub fn reverse_weights(&self, geometry_id: usize) -> FormatResult<Vec<u32>> {
        let range = self.range(geometry_id)?;
        Ok(self.reverse_weights.range(range).collect())
    }

    /// `(forward, reverse)` weight of the segment at `position` within
    /// `geometry_id`.
    pub fn segment_weights(&self, geometry_id: usize, position: u16) -> FormatResult<(u32, u32)> {
        let range = self.range(geometry_id)?;
        let position = usize::from(position);
        if position >= range.len() {
            return Err(FormatError::OutOfRange {
                section: Section::GeometryWeights,
                index: position,
                len: range.len(),
            });
        }
        let at = range.start + position;
        Ok((self.forward_weights.get(at)?, self.reverse_weights.get(at)?))
    }
}
