//! Fixed-stride record codec.
//!
//! # Data layout
//!
//! A section is a [`Metadata`] header followed by `element_count` records of
//! one fixed width:
//!
//! ```text
//! [ u64 element_count ][ record 0 ][ record 1 ] ... [ record n-1 ]
//! ```
//!
//! [`SectionReader`] walks a byte slice section by section, tracking the
//! byte offset so errors can point at where decoding stopped.  The full byte
//! length of a section is checked before anything is allocated or decoded,
//! so a bogus count can neither trigger a huge allocation nor yield a
//! partially filled array.

use crate::error::{FormatError, FormatResult, Section};
use crate::metadata::Metadata;

// ── Record ────────────────────────────────────────────────────────────────────

/// A fixed-width little-endian record.
///
/// `decode` receives exactly one record's bytes and must reject any other
/// length with [`FormatError::SizeMismatch`].  `encode` appends exactly
/// [`Record::SIZE`] bytes.
pub trait Record: Sized {
    /// Section the record lives in, for error reporting.
    const SECTION: Section;
    /// Stride in bytes.
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> FormatResult<Self>;

    fn encode(&self, out: &mut Vec<u8>);
}

/// Borrow `bytes` as a fixed-size array, or fail with `SizeMismatch`.
#[inline]
pub fn fixed<const N: usize>(section: Section, bytes: &[u8]) -> FormatResult<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|_| FormatError::SizeMismatch {
        section,
        offset: 0,
        expected: N,
        actual: bytes.len(),
    })
}

/// Copy the 2 bytes at `at` out of a fixed record buffer.
#[inline(always)]
pub fn le2<const N: usize>(b: &[u8; N], at: usize) -> [u8; 2] {
    [b[at], b[at + 1]]
}

/// Copy the 4 bytes at `at` out of a fixed record buffer.
#[inline(always)]
pub fn le4<const N: usize>(b: &[u8; N], at: usize) -> [u8; 4] {
    [b[at], b[at + 1], b[at + 2], b[at + 3]]
}

/// Byte length of `count` records, or `None` if it cannot be addressed.
fn byte_len<T: Record>(count: u64) -> Option<usize> {
    usize::try_from(count).ok()?.checked_mul(T::SIZE)
}

fn decode_all<T: Record>(payload: &[u8]) -> FormatResult<Vec<T>> {
    payload.chunks_exact(T::SIZE).map(T::decode).collect()
}

// ── SectionReader ─────────────────────────────────────────────────────────────

/// Forward-only cursor over a contiguous run of sections.
#[derive(Clone, Debug)]
pub struct SectionReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SectionReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `len` raw bytes.
    pub fn take(&mut self, section: Section, len: usize) -> FormatResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(FormatError::TruncatedInput {
                section,
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Consume an 8-byte [`Metadata`] header.
    pub fn read_metadata(&mut self, section: Section) -> FormatResult<Metadata> {
        let bytes = self.take(section, Metadata::SIZE)?;
        Metadata::decode(section, bytes)
    }

    /// Consume exactly `count` records of type `T`.
    pub fn read_records<T: Record>(&mut self, count: u64) -> FormatResult<Vec<T>> {
        let needed = byte_len::<T>(count).ok_or(FormatError::TruncatedInput {
            section: T::SECTION,
            offset: self.offset,
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        let start = self.offset;
        let payload = self.take(T::SECTION, needed)?;
        log::trace!(
            "{}: {} records ({} bytes) at byte {}",
            T::SECTION,
            count,
            needed,
            start
        );
        decode_all(payload)
    }

    /// Consume a [`Metadata`] header and the records it declares.
    pub fn read_section<T: Record>(&mut self) -> FormatResult<Vec<T>> {
        let metadata = self.read_metadata(T::SECTION)?;
        self.read_records(metadata.element_count)
    }

    /// Require that every byte has been consumed.
    ///
    /// Trailing bytes after the final section mean the writer and reader
    /// disagree about the layout; they are reported as a size mismatch.
    pub fn finish(&self, section: Section) -> FormatResult<()> {
        if self.is_exhausted() {
            Ok(())
        } else {
            Err(FormatError::SizeMismatch {
                section,
                offset: self.offset,
                expected: self.offset,
                actual: self.bytes.len(),
            })
        }
    }
}

// ── Detached headers ──────────────────────────────────────────────────────────

/// Decode a payload whose [`Metadata`] is stored elsewhere (for example a
/// `.meta` member next to the payload member in an archive).
///
/// The payload must hold exactly `count` records: a short payload is
/// `TruncatedInput`, any other disagreement is `SizeMismatch`.
pub fn decode_payload<T: Record>(count: u64, payload: &[u8]) -> FormatResult<Vec<T>> {
    let needed = byte_len::<T>(count).unwrap_or(usize::MAX);
    if payload.len() < needed {
        return Err(FormatError::TruncatedInput {
            section: T::SECTION,
            offset: 0,
            needed,
            available: payload.len(),
        });
    }
    if payload.len() != needed {
        return Err(FormatError::SizeMismatch {
            section: T::SECTION,
            offset: needed,
            expected: needed,
            actual: payload.len(),
        });
    }
    decode_all(payload)
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Append `records` without a header.
pub fn write_records<T: Record>(out: &mut Vec<u8>, records: &[T]) {
    out.reserve(records.len() * T::SIZE);
    for record in records {
        record.encode(out);
    }
}

/// Append a [`Metadata`] header followed by `records`.
pub fn write_section<T: Record>(out: &mut Vec<u8>, records: &[T]) {
    Metadata::new(records.len() as u64).encode(out);
    write_records(out, records);
}
