//! Element slot access
//!
//! Translates a logical index into a byte range of the mapping and copies
//! element values in and out of it. Offsets are recomputed on every call
//! because any growth replaces the mapping.

use crate::error::{MappedSliceError, Result};
use crate::header::HEADER_SIZE;
use std::mem::size_of;
use std::ops::Range;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Plain-data type that can live in a mapped slot
///
/// Any fixed-size type whose every bit pattern is valid and which has no
/// padding or references qualifies; derive zerocopy's `FromBytes`,
/// `IntoBytes` and `Immutable` on a `#[repr(C)]` struct to opt in.
pub trait Element: FromBytes + IntoBytes + Immutable {}

impl<T: FromBytes + IntoBytes + Immutable> Element for T {}

/// Byte range of slot `index`
pub fn slot_range(index: usize, element_size: usize) -> Range<usize> {
    let start = HEADER_SIZE + index * element_size;
    start..start + element_size
}

/// Copy the value out of slot `index`
pub fn read_slot<T: Element>(bytes: &[u8], index: usize) -> Result<T> {
    let range = slot_range(index, size_of::<T>());
    let raw = bytes
        .get(range.clone())
        .ok_or_else(|| outside_mapping(&range, bytes.len()))?;

    T::read_from_bytes(raw).map_err(|_| {
        MappedSliceError::Corrupted(format!("slot {} has the wrong size", index))
    })
}

/// Overwrite slot `index` with `value`
pub fn write_slot<T: Element>(bytes: &mut [u8], index: usize, value: &T) -> Result<()> {
    let range = slot_range(index, size_of::<T>());
    let mapped = bytes.len();
    let raw = bytes
        .get_mut(range.clone())
        .ok_or_else(|| outside_mapping(&range, mapped))?;

    raw.copy_from_slice(value.as_bytes());
    Ok(())
}

/// Move slots `[from, end)` one slot to the right, into `[from + 1, end + 1)`
///
/// Slot `from` keeps its old bytes until overwritten by the caller.
pub fn shift_right(bytes: &mut [u8], from: usize, end: usize, element_size: usize) -> Result<()> {
    if from >= end {
        return Ok(());
    }

    let src = HEADER_SIZE + from * element_size..HEADER_SIZE + end * element_size;
    let dest_end = src.end + element_size;
    if dest_end > bytes.len() {
        return Err(outside_mapping(&(src.start..dest_end), bytes.len()));
    }

    // copy_within is a memmove: the tail is moved before the head is overwritten
    let dest = src.start + element_size;
    bytes.copy_within(src, dest);
    Ok(())
}

/// Move slots `[from, end)` one slot to the left, into `[from - 1, end - 1)`
///
/// Slot `end - 1` keeps stale bytes; it lies past the new length.
pub fn shift_left(bytes: &mut [u8], from: usize, end: usize, element_size: usize) -> Result<()> {
    if from >= end || from == 0 {
        return Ok(());
    }

    let src = HEADER_SIZE + from * element_size..HEADER_SIZE + end * element_size;
    if src.end > bytes.len() {
        return Err(outside_mapping(&src, bytes.len()));
    }

    let dest = src.start - element_size;
    bytes.copy_within(src, dest);
    Ok(())
}

fn outside_mapping(range: &Range<usize>, mapped: usize) -> MappedSliceError {
    MappedSliceError::Corrupted(format!(
        "byte range {}..{} lies outside the {}-byte mapping",
        range.start, range.end, mapped
    ))
}
