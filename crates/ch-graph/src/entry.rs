//! CSR array records.
//!
//! # Edge record layout (16 bytes, little-endian)
//!
//! ```text
//! offset  width  field
//!      0      4  target                         u32
//!      4      4  turn_id:31 | shortcut:1        bit 31 = shortcut
//!      8      4  weight                         i32
//!     12      4  duration:30 | forward:1 | backward:1
//!                                               bit 30 = forward, bit 31 = backward,
//!                                               bits 0..=29 two's complement
//! ```
//!
//! [`EdgeArrayEntry`] keeps the packed words exactly as stored, so decoding a
//! record from bytes is total: every bit pattern is a valid entry.  Range
//! checks happen only on the way in, in [`encode_edge`].

use ch_core::bits::{pack_i30, pack_u31, unpack_i30, unpack_u31};
use ch_core::codec::{fixed, le4};
use ch_core::{EdgeId, FormatResult, NodeId, Record, Section, Weight};

// ── NodeArrayEntry ────────────────────────────────────────────────────────────

/// CSR row pointer: index of a node's first edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeArrayEntry {
    pub first_edge: EdgeId,
}

impl NodeArrayEntry {
    pub fn new(first_edge: u32) -> Self {
        Self { first_edge: EdgeId(first_edge) }
    }
}

impl Record for NodeArrayEntry {
    const SECTION: Section = Section::NodeArray;
    const SIZE: usize = 4;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 4] = fixed(Self::SECTION, bytes)?;
        Ok(Self::new(u32::from_le_bytes(b)))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.first_edge.0.to_le_bytes());
    }
}

// ── EdgeArrayEntry ────────────────────────────────────────────────────────────

/// A packed edge record as stored in the edge array.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeArrayEntry {
    pub target: NodeId,
    turn_word: u32,
    pub weight: Weight,
    duration_word: u32,
}

impl EdgeArrayEntry {
    #[inline]
    pub fn turn_id(&self) -> u32 {
        unpack_u31(self.turn_word).0
    }

    #[inline]
    pub fn shortcut(&self) -> bool {
        unpack_u31(self.turn_word).1
    }

    #[inline]
    pub fn duration(&self) -> i32 {
        unpack_i30(self.duration_word).0
    }

    #[inline]
    pub fn forward(&self) -> bool {
        unpack_i30(self.duration_word).1
    }

    #[inline]
    pub fn backward(&self) -> bool {
        unpack_i30(self.duration_word).2
    }

    /// `false` for a logically disabled edge (neither direction set).
    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.forward() || self.backward()
    }

    /// The two packed words, in storage order.
    pub fn raw_words(&self) -> (u32, u32) {
        (self.turn_word, self.duration_word)
    }
}

impl Record for EdgeArrayEntry {
    const SECTION: Section = Section::EdgeArray;
    const SIZE: usize = 16;

    fn decode(bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 16] = fixed(Self::SECTION, bytes)?;
        Ok(Self {
            target: NodeId(u32::from_le_bytes(le4(&b, 0))),
            turn_word: u32::from_le_bytes(le4(&b, 4)),
            weight: i32::from_le_bytes(le4(&b, 8)),
            duration_word: u32::from_le_bytes(le4(&b, 12)),
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.target.0.to_le_bytes());
        out.extend_from_slice(&self.turn_word.to_le_bytes());
        out.extend_from_slice(&self.weight.to_le_bytes());
        out.extend_from_slice(&self.duration_word.to_le_bytes());
    }
}

// ── EdgeData ──────────────────────────────────────────────────────────────────

/// An edge with every bit-field unpacked into its own scalar.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeData {
    pub target: NodeId,
    /// 31 bits.  On shortcut edges the producing pipeline decides what it
    /// means; this layer stores it verbatim.
    pub turn_id: u32,
    pub shortcut: bool,
    pub weight: Weight,
    /// Signed, 30 bits.
    pub duration: i32,
    pub forward: bool,
    pub backward: bool,
}

/// Unpack every field of `entry`.
#[inline]
pub fn decode_edge(entry: &EdgeArrayEntry) -> EdgeData {
    let (turn_id, shortcut) = unpack_u31(entry.turn_word);
    let (duration, forward, backward) = unpack_i30(entry.duration_word);
    EdgeData {
        target: entry.target,
        turn_id,
        shortcut,
        weight: entry.weight,
        duration,
        forward,
        backward,
    }
}

/// Pack `data` into a storage record.
///
/// # Errors
///
/// [`FieldOverflow`](ch_core::FormatError::FieldOverflow) when `turn_id`
/// exceeds 31 bits or `duration` leaves the signed 30-bit range.  Values are
/// never truncated.
pub fn encode_edge(data: &EdgeData) -> FormatResult<EdgeArrayEntry> {
    Ok(EdgeArrayEntry {
        target: data.target,
        turn_word: pack_u31("turn_id", data.turn_id, data.shortcut)?,
        weight: data.weight,
        duration_word: pack_i30("duration", data.duration, data.forward, data.backward)?,
    })
}

impl From<&EdgeArrayEntry> for EdgeData {
    fn from(entry: &EdgeArrayEntry) -> EdgeData {
        decode_edge(entry)
    }
}

impl TryFrom<&EdgeData> for EdgeArrayEntry {
    type Error = ch_core::FormatError;

    fn try_from(data: &EdgeData) -> FormatResult<EdgeArrayEntry> {
        encode_edge(data)
    }
}
