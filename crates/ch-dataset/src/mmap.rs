//! Read-only memory mapping of a flat section file.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use memmap2::Mmap;

use ch_core::FormatResult;

use crate::error::DatasetResult;

/// A section file mapped read-only for the duration of a load.
///
/// The decoded structures own their data, so the mapping can be dropped as
/// soon as loading returns.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    // `None` for an empty file: zero-length mappings are not portable.
    map: Option<Mmap>,
}

impl MappedFile {
    pub fn open(path: &Path) -> DatasetResult<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        // SAFETY: the mapping is read-only and the loaders copy every record
        // out of it.  A file truncated by another process while mapped
        // would fault, which a read-only dataset directory rules out.
        let map = if len == 0 { None } else { Some(unsafe { Mmap::map(&file)? }) };
        debug!("mapped {} ({len} bytes)", path.display());
        Ok(Self { path: path.to_owned(), map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Run one of the flat-layout `load` functions over the mapped bytes.
    ///
    /// ```rust,ignore
    /// let segments = MappedFile::open(path)?.load(SegmentTable::load)?;
    /// ```
    pub fn load<T>(&self, decode: impl FnOnce(&[u8]) -> FormatResult<T>) -> DatasetResult<T> {
        Ok(decode(self.bytes())?)
    }
}
