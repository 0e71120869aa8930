//! # Mapped Slice - Persistent Memory-Mapped Arrays
//!
//! `mapped-slice` stores a growable array of fixed-size, plain-data elements
//! in a single file that is memory-mapped into the process:
//!
//! - **Array semantics**: get, set, append, insert, remove, iterate
//! - **Durable**: contents survive close and reopen
//! - **Auto-growth**: capacity doubles (minimum 32 slots) when full
//! - **Cursors**: bidirectional position tracking independent of iteration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapped_slice::{MappedSlice, Result};
//!
//! # fn main() -> Result<()> {
//! let mut numbers = MappedSlice::<u64>::open("numbers.bin")?;
//!
//! numbers.append(10)?;
//! numbers.append(30)?;
//! numbers.insert_at(1, 20)?;
//!
//! assert_eq!(numbers.get(1)?, Some(20));
//! assert_eq!(numbers.to_vec()?, vec![10, 20, 30]);
//!
//! numbers.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Element Types
//!
//! Any `#[repr(C)]` type deriving zerocopy's `FromBytes`, `IntoBytes` and
//! `Immutable` can be stored:
//!
//! ```rust,no_run
//! use mapped_slice::MappedSlice;
//! use zerocopy::{FromBytes, Immutable, IntoBytes};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, FromBytes, IntoBytes, Immutable)]
//! struct Reading {
//!     timestamp: u64,
//!     value: f64,
//! }
//!
//! # fn main() -> mapped_slice::Result<()> {
//! let mut readings = MappedSlice::<Reading>::open("readings.bin")?;
//! readings.append(Reading { timestamp: 1, value: 0.5 })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [0, 8)    length    i64, host byte order     │
//! │ [8, 16)   capacity  i64, host byte order     │
//! ├──────────────────────────────────────────────┤
//! │ [16, 16 + capacity * size_of::<T>())         │
//! │   element slots in index order, stored with  │
//! │   the in-memory layout of T                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Files are not portable across platforms with a different endianness or
//! element layout. Reopening a file with a different element type is
//! undefined (but memory safe: every access is bounds-checked).
//!
//! ## Concurrency
//!
//! There is no internal locking. Sharing a file between threads or processes
//! requires external serialization.

// Core implementation
pub mod core;

// Re-export core modules internally so crate:: paths in core still work
pub(crate) use crate::core::{accessor, cursor, error, header, region, slice};

pub use crate::core::{
    accessor::Element,
    cursor::Cursor,
    error::{MappedSliceError, Result},
    header::{Header, DEFAULT_CAPACITY, HEADER_SIZE},
    slice::{Iter, MappedSlice, SliceOptions},
};

use std::path::PathBuf;
use tracing::{debug, info};

/// Builder for opening a mapped slice with custom options
///
/// # Examples
///
/// ```rust,no_run
/// use mapped_slice::MappedSliceBuilder;
///
/// # fn main() -> mapped_slice::Result<()> {
/// let slice = MappedSliceBuilder::new()
///     .path("/data/events.bin")
///     .initial_capacity(1024)
///     .max_capacity(1 << 20)
///     .build::<u64>()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MappedSliceBuilder {
    path: Option<PathBuf>,
    options: SliceOptions,
}

impl MappedSliceBuilder {
    /// Create a new MappedSliceBuilder with default settings
    pub fn new() -> Self {
        MappedSliceBuilder {
            path: None,
            options: SliceOptions::default(),
        }
    }

    /// Set the backing file path (required)
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Slots allocated when the file is created (default: 32)
    ///
    /// Has no effect when opening an existing file.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.options.initial_capacity = capacity;
        self
    }

    /// Refuse to grow past `capacity` slots
    pub fn max_capacity(mut self, capacity: usize) -> Self {
        self.options.max_capacity = Some(capacity);
        self
    }

    /// Flush the mapping before unmapping on close (default: true)
    pub fn flush_on_close(mut self, flush: bool) -> Self {
        self.options.flush_on_close = flush;
        self
    }

    /// Open or create the mapped slice
    pub fn build<T: Element>(self) -> Result<MappedSlice<T>> {
        let path = self.path.ok_or_else(|| {
            MappedSliceError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path must be set",
            ))
        })?;

        info!(
            "Building mapped slice at {:?} (initial capacity {})",
            path, self.options.initial_capacity
        );
        if let Some(max) = self.options.max_capacity {
            debug!("Capacity limited to {} slots", max);
        }

        MappedSlice::open_with(&path, self.options)
    }
}

impl Default for MappedSliceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
