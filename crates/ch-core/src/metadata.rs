//! Section header.
//!
//! Every variable-length array section is preceded by an 8-byte
//! little-endian element count.  Readers validate the section length against
//! that count instead of trusting whatever length the container reports.

use crate::codec::{SectionReader, fixed};
use crate::error::{FormatResult, Section};

/// Element-count header preceding an array section.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    pub element_count: u64,
}

impl Metadata {
    /// Encoded width in bytes.
    pub const SIZE: usize = 8;

    pub fn new(element_count: u64) -> Self {
        Self { element_count }
    }

    /// Decode from exactly [`Metadata::SIZE`] bytes.
    pub fn decode(section: Section, bytes: &[u8]) -> FormatResult<Self> {
        let b: [u8; 8] = fixed(section, bytes)?;
        Ok(Self::new(u64::from_le_bytes(b)))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.element_count.to_le_bytes());
    }
}

/// Consume exactly 8 bytes from `reader` and return the element count.
pub fn read_metadata(reader: &mut SectionReader<'_>, section: Section) -> FormatResult<u64> {
    reader.read_metadata(section).map(|m| m.element_count)
}

/// Emit the 8-byte header that must immediately precede a section's records.
pub fn write_metadata(out: &mut Vec<u8>, element_count: u64) {
    Metadata::new(element_count).encode(out);
}
