//! The segment table: `[ u64 s ][ EdgeBasedNodeSegment × s ]`.

use std::io::{self, Write};

use log::debug;

use ch_core::{FormatError, FormatResult, Record, Section, SectionReader, write_section};

use crate::segment::EdgeBasedNodeSegment;

/// Validated, immutable segment records in storage order.
///
/// Leaf nodes of the static R-tree address these records by index.
#[derive(Clone, Debug, Default)]
pub struct SegmentTable {
    segments: Vec<EdgeBasedNodeSegment>,
}

impl SegmentTable {
    /// Wrap records, rejecting the first malformed one.
    pub fn from_segments(segments: Vec<EdgeBasedNodeSegment>) -> FormatResult<Self> {
        for (index, segment) in segments.iter().enumerate() {
            segment.validate(index)?;
        }
        Ok(Self { segments })
    }

    /// Decode a flat segment section.
    ///
    /// # Errors
    ///
    /// `TruncatedInput`/`SizeMismatch` for a short or overlong section, then
    /// `DegenerateSegment`/`NoDirection` for the first malformed record.
    pub fn load(bytes: &[u8]) -> FormatResult<Self> {
        let mut reader = SectionReader::new(bytes);
        let segments = reader.read_section::<EdgeBasedNodeSegment>()?;
        reader.finish(Section::Segments)?;
        debug!("loaded {} segments ({} bytes)", segments.len(), bytes.len());
        Self::from_segments(segments)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> FormatResult<&EdgeBasedNodeSegment> {
        self.segments.get(index).ok_or(FormatError::OutOfRange {
            section: Section::Segments,
            index,
            len: self.segments.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeBasedNodeSegment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[EdgeBasedNodeSegment] {
        &self.segments
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.segments.len() * EdgeBasedNodeSegment::SIZE);
        write_section(&mut out, &self.segments);
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }
}

impl<'a> IntoIterator for &'a SegmentTable {
    type Item = &'a EdgeBasedNodeSegment;
    type IntoIter = std::slice::Iter<'a, EdgeBasedNodeSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
