use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappedSliceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index {index} is out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    #[error("Capacity exceeded: cannot grow past {max} slots (current capacity {capacity})")]
    CapacityExceeded { capacity: usize, max: usize },

    #[error("Backing file corrupted: {0}")]
    Corrupted(String),

    #[error("Zero-sized element types cannot be stored")]
    ZeroSizedElement,

    #[error("Mapped slice is closed")]
    Closed,

    #[error("Mapped slice has no valid mapping (a previous growth failed)")]
    Unmapped,

    #[error("Cursor is closed")]
    CursorClosed,
}

pub type Result<T> = std::result::Result<T, MappedSliceError>;
