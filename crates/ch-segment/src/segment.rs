//! Segment identifiers and segment records.
//!
//! # Segment record layout (20 bytes, little-endian)
//!
//! ```text
//! offset  width  field
//!      0      4  forward_segment_id   id:31 | enabled:1
//!      4      4  reverse_segment_id   id:31 | enabled:1
//!      8      4  u                    u32
//!     12      4  v                    u32
//!     16      2  fwd_segment_position u16
//!     18      2  padding              written as zero, ignored on read
//! ```

use std::fmt;

use ch_core::bits::{BIT_31, pack_u31, unpack_u31};
use ch_core::codec::{fixed, le2, le4};
use ch_core::{FormatError, FormatResult, NodeId, Record, Section};

// ── SegmentId ─────────────────────────────────────────────────────────────────

/// An edge-based graph node in one traversal direction.
///
/// When `enabled` is false there is no edge in that direction and `id`
/// carries no meaning.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentId {
    pub id: NodeId,
    pub enabled: bool,
}

impl SegmentId {
    /// "No edge in this direction".
    pub const DISABLED: SegmentId = SegmentId { id: NodeId(0), enabled: false };

    pub fn new(id: u32) -> Self {
        Self { id: NodeId(id), enabled: true }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// The id if enabled.
    pub fn get(&self) -> Option<NodeId> {
        self.enabled.then_some(self.id)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "{}", self.id)
        } else {
            f.write_str("disabled")
        }
    }
}

/// Unpack a stored 31+1 bit word.  Every bit pattern decodes.
#[inline]
pub fn decode_segment_id(word: u32) -> SegmentId {
    let (id, enabled) = unpack_u31(word);
    SegmentId { id: NodeId(id), enabled }
}

/// Pack `segment` into its stored word.
///
/// # Errors
///
/// [`FormatError::FieldOverflow`] when the id needs more than 31 bits.
#[inline]
pub fn encode_segment_id(segment: &SegmentId) -> FormatResult<u32> {
    pack_u31("segment_id", segment.id.0, segment.enabled)
}

// ── EdgeBasedNodeSegment ──────────────────────────────────────────────────────

/// One geometry segment `u → v` and the edge-based nodes covering it.
///
/// The directional ids stay packed exactly as stored; see
/// [`EdgeBasedNodeSegment::new`] for the checked constructor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeBasedNodeSegment {
    forward_word: u32,
    reverse_word: u32,
    pub u: NodeId,
    pub v: NodeId,
    /// Ordinal of this segment within its compressed polyline.
    pub fwd_segment_position: u16,
}

impl EdgeBasedNodeSegment {
    /// Pack a segment.  Fails only on id overflow; well-formedness is
    /// checked separately by [`validate`](Self::validate).
    pub fn new(
        forward: SegmentId,
        reverse: SegmentId,
        u: NodeId,
        v: NodeId,
        fwd_segment_position: u16,
    ) -> FormatResult<Self> {
        Ok(Self {
            forward_word: encode_segment_id(&forward)?,
            reverse_word: encode_segment_id(&reverse)?,
            u,
            v,
            fwd_segment_position,
        })
    }

    #[inline]
    pub fn forward_segment_id(&self) -> SegmentId {
        decode_segment_id(self.forward_word)
    }

    #[inline]
    pub fn reverse_segment_id(&self) -> SegmentId {
        decode_segment_id(self.reverse_word)
    }

    /// Check the record stored at `index` of its table.
    ///
    /// # Errors
    ///
    /// - [`FormatError::DegenerateSegment`] when `u == v`.
    /// - [`FormatError::NoDirection`] when neither direction is enabled.
    pub fn validate(&self, index: usize) -> FormatResult<()> {
        if self.u == self.v {
            return Err(FormatError::DegenerateSegment { index });
        }
        if !self.forward_segment_id().enabled && !self.reverse_segment_id().enabled {
            return Err(FormatError::NoDirection { index });
        }
        Ok(())
    }

    /// Copy with each direction kept only if it is enabled here and the
    /// matching argument allows it.  A consumer filtering by travel mode
    /// uses this; the result may be enabled in neither direction.
    pub fn restrict(&self, forward: bool, reverse: bool) -> Self {
        let mut out = *self;
        if !forward {
            out.forward_word &= !BIT_31;
        }
        if !reverse {
            out.reverse_word &= !BIT_31;
        }
        out
    }
}

impl Record for EdgeBasedNodeSegment {
    const SECTION: Section = Section::Segments;
    const SIZE: usize = 20;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 20] = fixed(Self::SECTION, bytes)?;
        Ok(Self {
            forward_word: u32::from_le_bytes(le4(&b, 0)),
            reverse_word: u32::from_le_bytes(le4(&b, 4)),
            u: NodeId(u32::from_le_bytes(le4(&b, 8))),
            v: NodeId(u32::from_le_bytes(le4(&b, 12))),
            fwd_segment_position: u16::from_le_bytes(le2(&b, 16)),
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.forward_word.to_le_bytes());
        out.extend_from_slice(&self.reverse_word.to_le_bytes());
        out.extend_from_slice(&self.u.0.to_le_bytes());
        out.extend_from_slice(&self.v.0.to_le_bytes());
        out.extend_from_slice(&self.fwd_segment_position.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
    }
}
