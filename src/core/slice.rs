//! Growable array engine
//!
//! [`MappedSlice`] provides array operations on top of a [`FileRegion`]. The
//! live length and the capacity are read from the mapped header on every
//! operation, so the file is always the source of truth.

use crate::accessor::{self, Element};
use crate::cursor::Cursor;
use crate::error::{MappedSliceError, Result};
use crate::header::{Header, DEFAULT_CAPACITY};
use crate::region::FileRegion;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, info, warn};

// Auto-growth constants
const GROW_FACTOR: usize = 2; // Double capacity each time

/// Options applied when a mapped slice is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceOptions {
    /// Slots allocated when the file is created (ignored for existing files)
    pub initial_capacity: usize,

    /// Hard limit on capacity (None = unlimited)
    pub max_capacity: Option<usize>,

    /// Flush the mapping to disk before unmapping on close
    pub flush_on_close: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            initial_capacity: DEFAULT_CAPACITY,
            max_capacity: None,
            flush_on_close: true,
        }
    }
}

/// Persistent, growable array of plain-data elements
///
/// Element slots live in a memory-mapped file. Reads return owned copies;
/// no reference into the mapping ever escapes, because growth remaps the
/// file and would invalidate it.
///
/// # Examples
///
/// ```rust,no_run
/// use mapped_slice::{MappedSlice, Result};
///
/// # fn main() -> Result<()> {
/// let mut slice = MappedSlice::<u64>::open("numbers.bin")?;
/// slice.append(1)?;
/// slice.append(3)?;
/// slice.insert_at(1, 2)?;
///
/// assert_eq!(slice.to_vec()?, vec![1, 2, 3]);
/// slice.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MappedSlice<T: Element> {
    region: FileRegion,
    max_capacity: Option<usize>,
    flush_on_close: bool,
    _element: PhantomData<T>,
}

impl<T: Element> MappedSlice<T> {
    /// Open or create a mapped slice with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, SliceOptions::default())
    }

    /// Open or create a mapped slice
    ///
    /// A new (empty) file is sized for `options.initial_capacity` slots. An
    /// existing file is mapped as-is; its element layout is assumed to match
    /// `T`.
    pub fn open_with<P: AsRef<Path>>(path: P, options: SliceOptions) -> Result<Self> {
        let element_size = size_of::<T>();
        if element_size == 0 {
            return Err(MappedSliceError::ZeroSizedElement);
        }

        if let Some(max) = options.max_capacity {
            if options.initial_capacity > max {
                return Err(MappedSliceError::CapacityExceeded {
                    capacity: options.initial_capacity,
                    max,
                });
            }
        }

        let path = path.as_ref();
        let region = FileRegion::open(path, element_size, options.initial_capacity)?;

        let header = Header::read_from(region.bytes()?)?;
        header.validate()?;

        let required = Header::file_size(header.capacity as usize, element_size).ok_or_else(|| {
            MappedSliceError::Corrupted(format!(
                "capacity {} of {}-byte elements overflows the file size",
                header.capacity, element_size
            ))
        })?;
        let mapped = region.bytes()?.len() as u64;
        if mapped < required {
            return Err(MappedSliceError::Corrupted(format!(
                "capacity {} needs {} bytes but file has {}",
                header.capacity, required, mapped
            )));
        }

        info!(
            "Opened mapped slice at {:?} (length {}, capacity {})",
            path, header.length, header.capacity
        );

        Ok(MappedSlice {
            region,
            max_capacity: options.max_capacity,
            flush_on_close: options.flush_on_close,
            _element: PhantomData,
        })
    }

    /// Copy of the element at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Result<Option<T>> {
        let bytes = self.region.bytes()?;
        let length = Self::length_of(bytes)?;
        if index >= length {
            return Ok(None);
        }

        accessor::read_slot(bytes, index).map(Some)
    }

    /// Overwrite the element at `index`
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let bytes = self.region.bytes_mut()?;
        let length = Self::length_of(bytes)?;
        if index >= length {
            return Err(MappedSliceError::IndexOutOfBounds { index, length });
        }

        accessor::write_slot(bytes, index, &value)
    }

    /// Append `value`, doubling capacity first if the slice is full
    pub fn append(&mut self, value: T) -> Result<()> {
        self.push_slot(&value)
    }

    /// Append every value in `values`, in order
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        debug!("Appending {} elements", values.len());
        for value in values {
            self.push_slot(value)?;
        }
        Ok(())
    }

    /// Insert `value` at `index`, shifting `[index, len)` one slot right
    ///
    /// `index == len()` behaves like [`append`](Self::append).
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<()> {
        let length = self.length()?;
        if index > length {
            return Err(MappedSliceError::IndexOutOfBounds { index, length });
        }

        self.grow_if_full(length)?;

        let bytes = self.region.bytes_mut()?;
        accessor::shift_right(bytes, index, length, size_of::<T>())?;
        accessor::write_slot(bytes, index, &value)?;
        Header::write_length(bytes, length + 1)
    }

    /// Remove the element at `index`, shifting `[index + 1, len)` one slot left
    ///
    /// Bytes of the vacated last slot stay in the file but are no longer
    /// reachable.
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        let bytes = self.region.bytes_mut()?;
        let length = Self::length_of(bytes)?;
        if index >= length {
            return Err(MappedSliceError::IndexOutOfBounds { index, length });
        }

        accessor::shift_left(bytes, index + 1, length, size_of::<T>())?;
        Header::write_length(bytes, length - 1)
    }

    /// Visit elements in ascending order until `f` breaks
    ///
    /// Returns `true` if `f` ended the walk early.
    pub fn for_each<F>(&self, mut f: F) -> Result<bool>
    where
        F: FnMut(T) -> ControlFlow<()>,
    {
        let bytes = self.region.bytes()?;
        let length = Self::length_of(bytes)?;

        for index in 0..length {
            let value = accessor::read_slot(bytes, index)?;
            if f(value).is_break() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Owned copy of every live element
    ///
    /// The returned vector is independent of the file and stays valid after
    /// further mutation or close.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let bytes = self.region.bytes()?;
        let length = Self::length_of(bytes)?;

        let mut out = Vec::with_capacity(length);
        for index in 0..length {
            out.push(accessor::read_slot(bytes, index)?);
        }
        Ok(out)
    }

    /// Number of live elements (0 once closed)
    pub fn len(&self) -> usize {
        self.length().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated slots (0 once closed)
    pub fn capacity(&self) -> usize {
        self.header()
            .map(|header| header.capacity as usize)
            .unwrap_or(0)
    }

    /// Make room for at least `additional` more elements
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let length = self.length()?;
        let target = length
            .checked_add(additional)
            .ok_or_else(|| MappedSliceError::CapacityExceeded {
                capacity: self.capacity(),
                max: usize::MAX,
            })?;
        self.grow_to(target)
    }

    /// Grow capacity to exactly `capacity` slots (no-op if already larger)
    pub fn grow_to(&mut self, capacity: usize) -> Result<()> {
        let current = self.header()?.capacity as usize;
        if capacity <= current {
            return Ok(());
        }

        if let Some(max) = self.max_capacity {
            if capacity > max {
                return Err(MappedSliceError::CapacityExceeded {
                    capacity: current,
                    max,
                });
            }
        }

        self.grow(current, capacity)
    }

    /// Iterator over copies of the live elements
    ///
    /// # Errors
    ///
    /// The iterator cannot report errors. A read failure (closed, unmapped or
    /// corrupted slice) ends iteration early. Use [`to_vec`](Self::to_vec) or
    /// [`for_each`](Self::for_each) when the error matters.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slice: self,
            index: 0,
            end: self.len(),
        }
    }

    /// Create a cursor positioned at index 0
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self)
    }

    /// Run `f` with a fresh cursor, closing it afterwards
    pub fn with_cursor<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Cursor<'_, T>) -> Result<R>,
    {
        let mut cursor = self.cursor();
        let result = f(&mut cursor);
        cursor.close();
        result
    }

    /// Flush pending writes to the backing file
    pub fn flush(&self) -> Result<()> {
        debug!("Flushing {:?}", self.region.path());
        self.region.flush()
    }

    /// Unmap and close the backing file
    ///
    /// Calling close again is a no-op. Every other operation fails with
    /// [`MappedSliceError::Closed`] afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.region.close(self.flush_on_close)
    }

    pub fn is_closed(&self) -> bool {
        self.region.is_closed()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.region.path()
    }

    /// Byte size of one element slot
    pub fn element_size(&self) -> usize {
        self.region.element_size()
    }

    /// Current size of the backing file in bytes
    pub fn file_len(&self) -> Result<u64> {
        self.region.file_len()
    }

    fn push_slot(&mut self, value: &T) -> Result<()> {
        let length = self.length()?;
        self.grow_if_full(length)?;

        let bytes = self.region.bytes_mut()?;
        accessor::write_slot(bytes, length, value)?;
        Header::write_length(bytes, length + 1)
    }

    /// Grow ahead of a write into slot `length`
    fn grow_if_full(&mut self, length: usize) -> Result<()> {
        let capacity = self.header()?.capacity as usize;
        if length < capacity {
            return Ok(());
        }

        let doubled = capacity.saturating_mul(GROW_FACTOR).max(DEFAULT_CAPACITY);
        let new_capacity = match self.max_capacity {
            Some(max) => doubled.min(max),
            None => doubled,
        };

        if new_capacity <= capacity {
            return Err(MappedSliceError::CapacityExceeded {
                capacity,
                max: self.max_capacity.unwrap_or(capacity),
            });
        }

        self.grow(capacity, new_capacity)
    }

    fn grow(&mut self, current: usize, new_capacity: usize) -> Result<()> {
        let limit = Header::max_capacity(self.element_size());
        if new_capacity > limit {
            return Err(MappedSliceError::CapacityExceeded {
                capacity: current,
                max: limit,
            });
        }

        info!(
            "Growing mapped slice: {} -> {} slots",
            current, new_capacity
        );
        self.region.remap(new_capacity)
    }

    fn header(&self) -> Result<Header> {
        Header::read_from(self.region.bytes()?)
    }

    fn length(&self) -> Result<usize> {
        Self::length_of(self.region.bytes()?)
    }

    fn length_of(bytes: &[u8]) -> Result<usize> {
        Ok(Header::read_from(bytes)?.length as usize)
    }
}

impl<T: Element> Drop for MappedSlice<T> {
    fn drop(&mut self) {
        if self.region.is_closed() {
            return;
        }

        if let Err(e) = self.region.close(self.flush_on_close) {
            warn!("Failed to close {:?}: {}", self.region.path(), e);
        }
    }
}

/// Iterator over copies of a slice's elements
///
/// Created by [`MappedSlice::iter`]. The borrow of the slice keeps it from
/// being mutated or grown while iterating.
#[derive(Debug)]
pub struct Iter<'a, T: Element> {
    slice: &'a MappedSlice<T>,
    index: usize,
    end: usize,
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index >= self.end {
            return None;
        }

        let value = self.slice.get(self.index).ok().flatten();
        self.index += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.index);
        (0, Some(remaining))
    }
}

impl<'a, T: Element> IntoIterator for &'a MappedSlice<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
