//! Fixed-width weights bit-packed into little-endian `u64` words.
//!
//! # Layout
//!
//! Element `i` occupies bits `22·i .. 22·i + 22` of the word stream, counted
//! from the least significant bit of word 0.  An element that crosses a word
//! boundary keeps its low bits at the top of the earlier word.
//!
//! ```text
//! word 0:  [63..44] e2 bits 0..=19   [43..22] e1   [21..0] e0
//! word 1:  ...   [23..2] e3   [1..0] e2 bits 20..=21
//! ```
//!
//! The stored payload is the word stream only; the element count lives in
//! the member's `.meta` sidecar.  Bits past the last element are written as
//! zero and ignored on read.

use std::ops::Range;

use ch_core::codec::fixed;
use ch_core::{FormatError, FormatResult, Section};

/// Width of one packed weight.
pub const WEIGHT_BITS: u32 = 22;

/// Largest weight that fits [`WEIGHT_BITS`].
pub const WEIGHT_MAX: u32 = (1 << WEIGHT_BITS) - 1;

const WEIGHT_MASK: u64 = WEIGHT_MAX as u64;
const WORD_BITS: usize = 64;
const WORD_BYTES: usize = 8;

/// Words needed for `len` elements, or `None` if that overflows.
fn word_count(len: usize) -> Option<usize> {
    Some(len.checked_mul(WEIGHT_BITS as usize)?.div_ceil(WORD_BITS))
}

/// Word index and bit shift of element `index`.
#[inline]
fn position(index: usize) -> (usize, usize) {
    let bit = index * WEIGHT_BITS as usize;
    (bit / WORD_BITS, bit % WORD_BITS)
}

#[inline]
fn straddles(shift: usize) -> bool {
    shift + WEIGHT_BITS as usize > WORD_BITS
}

/// An immutable vector of 22-bit weights.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedWeights {
    words: Vec<u64>,
    len: usize,
}

impl PackedWeights {
    /// Pack `values`.
    ///
    /// # Errors
    ///
    /// [`FormatError::FieldOverflow`] naming `field` for the first value
    /// above [`WEIGHT_MAX`].
    pub fn from_values(field: &'static str, values: &[u32]) -> FormatResult<Self> {
        let mut words = vec![0u64; (values.len() * WEIGHT_BITS as usize).div_ceil(WORD_BITS)];
        for (index, &value) in values.iter().enumerate() {
            if value > WEIGHT_MAX {
                return Err(FormatError::FieldOverflow {
                    field,
                    value: i64::from(value),
                    bits: WEIGHT_BITS,
                });
            }
            let (word, shift) = position(index);
            let value = u64::from(value);
            words[word] |= value << shift;
            if straddles(shift) {
                words[word + 1] |= value >> (WORD_BITS - shift);
            }
        }
        Ok(Self { words, len: values.len() })
    }

    /// Decode `len` weights from a stored word stream.
    ///
    /// Whole words past the ones `len` needs are dropped, like the padding
    /// of an edge filter.
    ///
    /// # Errors
    ///
    /// - [`FormatError::TruncatedInput`] when `payload` holds fewer words
    ///   than `len` elements need.
    /// - [`FormatError::SizeMismatch`] when `payload` is not a whole number
    ///   of words.
    pub fn from_bytes(len: u64, payload: &[u8]) -> FormatResult<Self> {
        let section = Section::GeometryWeights;
        let available = payload.len();
        let truncated = |needed| FormatError::TruncatedInput { section, offset: 0, needed, available };

        let len = usize::try_from(len).map_err(|_| truncated(usize::MAX))?;
        let needed = word_count(len)
            .and_then(|words| words.checked_mul(WORD_BYTES))
            .ok_or_else(|| truncated(usize::MAX))?;
        if needed > available {
            return Err(truncated(needed));
        }
        let tail = available % WORD_BYTES;
        if tail != 0 {
            return Err(FormatError::SizeMismatch {
                section,
                offset: available - tail,
                expected: WORD_BYTES,
                actual: tail,
            });
        }

        let words = payload[..needed]
            .chunks_exact(WORD_BYTES)
            .map(|chunk| fixed::<WORD_BYTES>(section, chunk).map(u64::from_le_bytes))
            .collect::<FormatResult<Vec<u64>>>()?;
        Ok(Self { words, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The backing words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn get(&self, index: usize) -> FormatResult<u32> {
        if index >= self.len {
            return Err(FormatError::OutOfRange {
                section: Section::GeometryWeights,
                index,
                len: self.len,
            });
        }
        Ok(self.value_at(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.range(0..self.len)
    }

    /// Weights in `range`.  The caller keeps `range` within `len`.
    pub(crate) fn range(&self, range: Range<usize>) -> impl Iterator<Item = u32> + '_ {
        range.map(move |index| self.value_at(index))
    }

    /// The stored word stream, little-endian.
    pub fn encode(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    #[inline]
    fn value_at(&self, index: usize) -> u32 {
        let (word, shift) = position(index);
        let mut value = self.words[word] >> shift;
        if straddles(shift) {
            value |= self.words[word + 1] << (WORD_BITS - shift);
        }
        (value & WEIGHT_MASK) as u32
    }
}
