//! Core implementation: on-disk header, file region, slot access, the
//! growable array engine and its cursor.

pub mod accessor;
pub mod cursor;
pub mod error;
pub mod header;
pub mod region;
pub mod slice;

pub use accessor::Element;
pub use cursor::Cursor;
pub use error::{MappedSliceError, Result};
pub use header::{Header, DEFAULT_CAPACITY, HEADER_SIZE};
pub use region::FileRegion;
pub use slice::{Iter, MappedSlice, SliceOptions};
