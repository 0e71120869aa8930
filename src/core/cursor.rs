//! Bidirectional cursor over a mapped slice
//!
//! A cursor holds a signed position and a borrow of its slice, never an
//! address inside the mapping. The position moves on every step, even when
//! it leaves `[0, len)`: stepping past either end returns `None` and a step
//! back in the other direction lands on the last element again.

use crate::accessor::Element;
use crate::error::{MappedSliceError, Result};
use crate::slice::MappedSlice;

/// Stateful cursor created by [`MappedSlice::cursor`]
///
/// # Examples
///
/// ```rust,no_run
/// use mapped_slice::{MappedSlice, Result};
///
/// # fn main() -> Result<()> {
/// let mut slice = MappedSlice::<u32>::open("cursor.bin")?;
/// slice.extend_from_slice(&[0, 1, 2])?;
///
/// let mut cursor = slice.cursor();
/// assert_eq!(cursor.seek(2)?, Some(2));
/// assert_eq!(cursor.prev()?, Some(1));
/// assert_eq!(cursor.prev()?, Some(0));
/// assert_eq!(cursor.prev()?, None);
/// cursor.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cursor<'a, T: Element> {
    position: i64,
    slice: Option<&'a MappedSlice<T>>,
}

impl<'a, T: Element> Cursor<'a, T> {
    pub(crate) fn new(slice: &'a MappedSlice<T>) -> Self {
        Cursor {
            position: 0,
            slice: Some(slice),
        }
    }

    /// Move to `index` and return the element there
    ///
    /// The position is updated even when `index` is out of range.
    pub fn seek(&mut self, index: i64) -> Result<Option<T>> {
        let slice = self.attached()?;
        self.position = index;
        Self::load(slice, self.position)
    }

    /// Step forward one position and return the element there
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<T>> {
        let slice = self.attached()?;
        self.position = self.position.saturating_add(1);
        Self::load(slice, self.position)
    }

    /// Step back one position and return the element there
    pub fn prev(&mut self) -> Result<Option<T>> {
        let slice = self.attached()?;
        self.position = self.position.saturating_sub(1);
        Self::load(slice, self.position)
    }

    /// Detach from the slice
    ///
    /// Every later `seek`, `next` or `prev` returns
    /// [`MappedSliceError::CursorClosed`].
    pub fn close(&mut self) {
        self.slice = None;
    }

    /// Current position, which may lie outside `[0, len)`
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_closed(&self) -> bool {
        self.slice.is_none()
    }

    fn attached(&self) -> Result<&'a MappedSlice<T>> {
        self.slice.ok_or(MappedSliceError::CursorClosed)
    }

    fn load(slice: &MappedSlice<T>, position: i64) -> Result<Option<T>> {
        match usize::try_from(position) {
            Ok(index) => slice.get(index),
            Err(_) => Ok(None),
        }
    }
}
