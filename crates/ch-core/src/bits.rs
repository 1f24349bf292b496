//! Explicit shift/mask packing for sub-word fields.
//!
//! The portable contract is a plain `u32` word: the value field occupies the
//! low bits, flags occupy the top bit(s).  Native bit-field layout is never
//! relied on.
//!
//! ```text
//! 31+1 word:    [31] flag      [30..0]  unsigned value
//! 30+1+1 word:  [31] hi flag   [30] lo flag   [29..0] signed value (two's complement)
//! ```

use crate::error::{FormatError, FormatResult};

/// Largest value of an unsigned 31-bit field.
pub const U31_MAX: u32 = (1 << 31) - 1;

/// Smallest value of a signed 30-bit field.
pub const I30_MIN: i32 = -(1 << 29);

/// Largest value of a signed 30-bit field.
pub const I30_MAX: i32 = (1 << 29) - 1;

/// Flag bit of a 31+1 word; also the `hi` flag of a 30+1+1 word.
pub const BIT_31: u32 = 1 << 31;
const BIT_30: u32 = 1 << 30;
const I30_MASK: u32 = BIT_30 - 1;

/// Pack an unsigned 31-bit value with a flag in bit 31.
///
/// `field` names the value in the [`FormatError::FieldOverflow`] raised when
/// `value > U31_MAX`.
#[inline]
pub fn pack_u31(field: &'static str, value: u32, flag: bool) -> FormatResult<u32> {
    if value > U31_MAX {
        return Err(FormatError::FieldOverflow {
            field,
            value: i64::from(value),
            bits: 31,
        });
    }
    Ok(value | if flag { BIT_31 } else { 0 })
}

/// Inverse of [`pack_u31`].  Total: every word decodes.
#[inline]
pub fn unpack_u31(word: u32) -> (u32, bool) {
    (word & U31_MAX, word & BIT_31 != 0)
}

/// Pack a signed 30-bit value with flags in bits 30 (`lo`) and 31 (`hi`).
#[inline]
pub fn pack_i30(field: &'static str, value: i32, lo: bool, hi: bool) -> FormatResult<u32> {
    if !(I30_MIN..=I30_MAX).contains(&value) {
        return Err(FormatError::FieldOverflow {
            field,
            value: i64::from(value),
            bits: 30,
        });
    }
    let mut word = (value as u32) & I30_MASK;
    if lo {
        word |= BIT_30;
    }
    if hi {
        word |= BIT_31;
    }
    Ok(word)
}

/// Inverse of [`pack_i30`], sign-extending the value from bit 29.
#[inline]
pub fn unpack_i30(word: u32) -> (i32, bool, bool) {
    let value = ((word << 2) as i32) >> 2;
    (value, word & BIT_30 != 0, word & BIT_31 != 0)
}
