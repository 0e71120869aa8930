//! File region management for mapped slices
//!
//! Owns the backing file and its current memory mapping. Growth replaces the
//! mapping wholesale, so nothing outside this module may hold on to an
//! address inside it.

use crate::error::{MappedSliceError, Result};
use crate::header::Header;
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Memory-mapped backing file
#[derive(Debug)]
pub struct FileRegion {
    /// Backing file (None once closed)
    file: Option<File>,

    /// Current mapping (None while unmapped, or after a failed remap)
    mmap: Option<MmapMut>,

    path: PathBuf,

    /// Byte size of one element slot
    element_size: usize,
}

impl FileRegion {
    /// Open or create the backing file and map it
    ///
    /// A zero-length file is treated as new: it is truncated to hold
    /// `initial_capacity` slots and given an empty header. Any other file is
    /// mapped as-is.
    pub fn open<P: AsRef<Path>>(
        path: P,
        element_size: usize,
        initial_capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_len = file.metadata()?.len();

        let mut region = FileRegion {
            file: Some(file),
            mmap: None,
            path: path.to_path_buf(),
            element_size,
        };

        if file_len == 0 {
            debug!(
                "Initializing {:?} with {} slots of {} bytes",
                path, initial_capacity, element_size
            );
            region.remap(initial_capacity)?;
            Header::new(initial_capacity).write_to(region.bytes_mut()?)?;
        } else {
            region.map()?;
        }

        Ok(region)
    }

    /// Resize the file to hold `capacity` slots and map it again
    ///
    /// The old mapping is released before the file is truncated. If the
    /// truncate or the new mapping fails, the region is left unmapped and
    /// every later access returns [`MappedSliceError::Unmapped`]. A capacity
    /// whose file size overflows is rejected before anything is unmapped.
    pub fn remap(&mut self, capacity: usize) -> Result<()> {
        if self.file.is_none() {
            return Err(MappedSliceError::Closed);
        }

        let size = Header::file_size(capacity, self.element_size).ok_or_else(|| {
            MappedSliceError::CapacityExceeded {
                capacity,
                max: Header::max_capacity(self.element_size),
            }
        })?;

        self.unmap();
        debug!("Remapping {:?} to {} bytes ({} slots)", self.path, size, capacity);

        if let Some(file) = &self.file {
            file.set_len(size)?;
        }
        self.map()?;

        Header::write_capacity(self.bytes_mut()?, capacity)
    }

    /// Flush dirty pages of the mapping back to the file
    pub fn flush(&self) -> Result<()> {
        self.mapping()?.flush()?;
        Ok(())
    }

    /// Unmap, then close the file
    ///
    /// Safe to call more than once. With `flush` set, the mapping is written
    /// back first so write-back failures are reported instead of lost.
    pub fn close(&mut self, flush: bool) -> Result<()> {
        if let Some(mmap) = self.mmap.take() {
            if flush {
                mmap.flush()?;
            }
            drop(mmap);
        }

        if let Some(file) = self.file.take() {
            debug!("Closing {:?}", self.path);
            drop(file);
        }

        Ok(())
    }

    /// Whole mapping, header included
    pub fn bytes(&self) -> Result<&[u8]> {
        Ok(&self.mapping()?[..])
    }

    /// Whole mapping, header included, writable
    pub fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        if self.file.is_none() {
            return Err(MappedSliceError::Closed);
        }
        match self.mmap.as_mut() {
            Some(mmap) => Ok(&mut mmap[..]),
            None => Err(MappedSliceError::Unmapped),
        }
    }

    /// Length of the backing file on disk
    pub fn file_len(&self) -> Result<u64> {
        let file = self.file.as_ref().ok_or(MappedSliceError::Closed)?;
        Ok(file.metadata()?.len())
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    fn mapping(&self) -> Result<&MmapMut> {
        if self.file.is_none() {
            return Err(MappedSliceError::Closed);
        }
        self.mmap.as_ref().ok_or(MappedSliceError::Unmapped)
    }

    fn map(&mut self) -> Result<()> {
        let file = self.file.as_ref().ok_or(MappedSliceError::Closed)?;

        // SAFETY: MmapMut::map_mut is unsafe because the file may be modified
        // or truncated by another process while mapped. Concurrent use of the
        // same file requires external serialization. Within this process the
        // mapping is owned by this region, it is dropped before every
        // truncate, and all access goes through bounds-checked slices.
        let mmap = unsafe { MmapMut::map_mut(file)? };

        self.mmap = Some(mmap);
        Ok(())
    }

    fn unmap(&mut self) {
        // memmap2 unmaps on drop
        self.mmap = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{DEFAULT_CAPACITY, HEADER_SIZE};
    use tempfile::TempDir;

    #[test]
    fn test_create_initializes_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("region.bin");

        let region = FileRegion::open(&path, 8, DEFAULT_CAPACITY).unwrap();

        assert_eq!(region.file_len().unwrap(), (HEADER_SIZE + 32 * 8) as u64);
        let header = Header::read_from(region.bytes().unwrap()).unwrap();
        assert_eq!(header.length, 0);
        assert_eq!(header.capacity, 32);
    }

    #[test]
    fn test_remap_grows_file_and_keeps_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grow.bin");

        let mut region = FileRegion::open(&path, 4, 2).unwrap();
        region.bytes_mut().unwrap()[HEADER_SIZE..HEADER_SIZE + 8]
            .copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        region.remap(10).unwrap();

        assert_eq!(region.file_len().unwrap(), (HEADER_SIZE + 40) as u64);
        assert_eq!(region.bytes().unwrap().len(), HEADER_SIZE + 40);
        assert_eq!(
            &region.bytes().unwrap()[HEADER_SIZE..HEADER_SIZE + 8],
            &[1, 2, 3, 4, 5, 6, 7, 8]
        );
        let header = Header::read_from(region.bytes().unwrap()).unwrap();
        assert_eq!(header.capacity, 10);
    }

    #[test]
    fn test_reopen_maps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reopen.bin");

        {
            let mut region = FileRegion::open(&path, 8, 4).unwrap();
            Header::write_length(region.bytes_mut().unwrap(), 3).unwrap();
            region.close(true).unwrap();
        }

        // Initial capacity is ignored for an existing file
        let region = FileRegion::open(&path, 8, 100).unwrap();
        let header = Header::read_from(region.bytes().unwrap()).unwrap();
        assert_eq!(header.length, 3);
        assert_eq!(header.capacity, 4);
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("close.bin");

        let mut region = FileRegion::open(&path, 8, 4).unwrap();
        region.close(true).unwrap();
        region.close(true).unwrap();

        assert!(region.is_closed());
        assert!(matches!(region.bytes(), Err(MappedSliceError::Closed)));
        assert!(matches!(region.remap(8), Err(MappedSliceError::Closed)));
    }

    #[test]
    fn test_remap_overflow_keeps_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("overflow.bin");

        let mut region = FileRegion::open(&path, 8, 4).unwrap();
        assert!(matches!(
            region.remap(usize::MAX),
            Err(MappedSliceError::CapacityExceeded { .. })
        ));

        let header = Header::read_from(region.bytes().unwrap()).unwrap();
        assert_eq!(header.capacity, 4);
        assert_eq!(region.file_len().unwrap(), (HEADER_SIZE + 4 * 8) as u64);
    }
}
