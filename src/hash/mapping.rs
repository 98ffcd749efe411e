// Memory-mapped chunk sources
// Byte views handed to the reducer one block at a time

use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use super::error::ChecksumError;

/// An owned view of mapped file bytes, unmapped on drop
#[derive(Debug)]
pub enum MappedRegion {
    /// Zero-length ranges are never handed to the OS
    Empty,
    Mapped(Mmap),
}

impl Deref for MappedRegion {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            MappedRegion::Empty => &[],
            MappedRegion::Mapped(mmap) => &mmap[..],
        }
    }
}

/// Map `[offset, offset + length)` of `file`.
///
/// Zero-length ranges give [`MappedRegion::Empty`] without touching the OS.
pub fn map_range(file: &File, path: &Path, offset: u64, length: u64) -> Result<MappedRegion, ChecksumError> {
    if length == 0 {
        return Ok(MappedRegion::Empty);
    }
    let map_failure = |source: io::Error| ChecksumError::MapFailure {
        path: path.to_path_buf(),
        offset,
        length,
        source,
    };
    let len = usize::try_from(length).map_err(|_| {
        map_failure(io::Error::new(
            io::ErrorKind::InvalidInput,
            "range does not fit in the address space",
        ))
    })?;

    // SAFETY: the file must not be truncated by another process while mapped
    let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map(file) }.map_err(map_failure)?;

    #[cfg(unix)]
    {
        // Advice is only a hint
        let _ = mmap.advise(memmap2::Advice::Sequential);
    }

    Ok(MappedRegion::Mapped(mmap))
}

/// Map the first `length` bytes of `file` (its whole size as planned)
pub fn map_whole_file(file: &File, path: &Path, length: u64) -> Result<MappedRegion, ChecksumError> {
    map_range(file, path, 0, length)
}

/// Something the reducer can borrow a block of bytes from
pub trait ChunkSource: Sync {
    /// Run `f` over the bytes `[offset, offset + length)`.
    ///
    /// The view only lives for the duration of the call.
    fn with_block<R>(
        &self,
        offset: u64,
        length: u64,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, ChecksumError>;
}

/// A file mapped once in full; blocks are slices of the same mapping
pub struct WholeFileSource {
    path: PathBuf,
    region: MappedRegion,
}

impl WholeFileSource {
    pub fn open(file: &File, path: &Path, length: u64) -> Result<Self, ChecksumError> {
        Ok(Self {
            path: path.to_path_buf(),
            region: map_whole_file(file, path, length)?,
        })
    }
}

impl ChunkSource for WholeFileSource {
    fn with_block<R>(
        &self,
        offset: u64,
        length: u64,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, ChecksumError> {
        let start = usize::try_from(offset).ok();
        let end = offset.checked_add(length).and_then(|end| usize::try_from(end).ok());
        match (start, end) {
            (Some(start), Some(end)) if end <= self.region.len() => Ok(f(&self.region[start..end])),
            _ => Err(ChecksumError::MapFailure {
                path: self.path.clone(),
                offset,
                length,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "range lies outside the mapped file"),
            }),
        }
    }
}

/// A file mapped block by block; every call creates and drops its own mapping
pub struct TieredFileSource {
    path: PathBuf,
    file: File,
}

impl TieredFileSource {
    pub fn new(file: File, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file,
        }
    }
}

impl ChunkSource for TieredFileSource {
    fn with_block<R>(
        &self,
        offset: u64,
        length: u64,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, ChecksumError> {
        let region = map_range(&self.file, &self.path, offset, length)?;
        Ok(f(&region[..]))
    }
}

/// In-memory bytes, used where no file is involved
impl ChunkSource for [u8] {
    fn with_block<R>(
        &self,
        offset: u64,
        length: u64,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, ChecksumError> {
        let start = usize::try_from(offset).ok();
        let end = offset.checked_add(length).and_then(|end| usize::try_from(end).ok());
        match (start, end) {
            (Some(start), Some(end)) if end <= self.len() => Ok(f(&self[start..end])),
            _ => Err(ChecksumError::IoError {
                path: None,
                operation: format!("slicing {} bytes at offset {}", length, offset),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "range lies outside the buffer"),
            }),
        }
    }
}
