//! Per-edge inclusion mask.
//!
//! Some datasets ship an exclusion filter per metric: one bit per edge,
//! set when the edge takes part in routing.  Bits are stored LSB-first
//! within each byte.  The producer may write whole machine words, so the
//! stored payload can be longer than `⌈n / 8⌉`; bits past `n` are padding
//! and are dropped on load.

use bitvec::prelude::{BitVec, Lsb0};

use ch_core::{FormatError, FormatResult, Section, SectionReader, write_metadata};

/// One inclusion bit per edge of the graph it is attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    bits: BitVec<u8, Lsb0>,
}

impl EdgeFilter {
    /// A filter that includes all `edge_count` edges.
    pub fn all(edge_count: usize) -> Self {
        Self { bits: BitVec::repeat(true, edge_count) }
    }

    /// Build from raw storage bytes holding at least `element_count` bits.
    pub fn from_bytes(element_count: u64, bytes: Vec<u8>) -> FormatResult<Self> {
        let needed = usize::try_from(element_count)
            .map(|n| n.div_ceil(8))
            .unwrap_or(usize::MAX);
        if bytes.len() < needed {
            return Err(FormatError::TruncatedInput {
                section: Section::EdgeFilter,
                offset: 0,
                needed,
                available: bytes.len(),
            });
        }
        let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
        bits.truncate(element_count as usize);
        Ok(Self { bits })
    }

    /// Decode the flat layout: `Metadata(n)` followed by `⌈n / 8⌉` bytes.
    pub fn load(bytes: &[u8]) -> FormatResult<Self> {
        let mut reader = SectionReader::new(bytes);
        let metadata = reader.read_metadata(Section::EdgeFilter)?;
        let count = usize::try_from(metadata.element_count).unwrap_or(usize::MAX);
        let payload = reader.take(Section::EdgeFilter, count.div_ceil(8))?;
        reader.finish(Section::EdgeFilter)?;
        Self::from_bytes(metadata.element_count, payload.to_vec())
    }

    /// Inverse of [`EdgeFilter::load`].  Padding bits are written as zero.
    pub fn encode(&self) -> Vec<u8> {
        let mut bits = self.bits.clone();
        bits.set_uninitialized(false);
        let payload = bits.into_vec();

        let mut out = Vec::with_capacity(8 + payload.len());
        write_metadata(&mut out, self.bits.len() as u64);
        out.extend_from_slice(&payload);
        out
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `true` if `edge` takes part in routing.  Edges past the end are
    /// excluded.
    #[inline]
    pub fn includes(&self, edge: usize) -> bool {
        self.bits.get(edge).map(|bit| *bit).unwrap_or(false)
    }

    /// Number of included edges.
    pub fn count_included(&self) -> usize {
        self.bits.count_ones()
    }
}

impl FromIterator<bool> for EdgeFilter {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self { bits: iter.into_iter().collect() }
    }
}
