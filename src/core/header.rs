use crate::error::{MappedSliceError, Result};

/// Size of the header in bytes. Element slots start right after it.
pub const HEADER_SIZE: usize = 16;
pub const LENGTH_OFFSET: usize = 0;
pub const CAPACITY_OFFSET: usize = 8;

/// Capacity of a freshly created file, and the floor of the growth policy.
pub const DEFAULT_CAPACITY: usize = 32;

/// Mapped slice header (first 16 bytes of the file)
///
/// Both fields are stored as signed 64-bit integers in host byte order, so a
/// file is only portable between machines with the same endianness and the
/// same element layout.
///
/// ```text
/// [0, 8)   length    live elements
/// [8, 16)  capacity  allocated element slots
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Number of live elements
    pub length: i64,

    /// Number of allocated element slots
    pub capacity: i64,
}

impl Header {
    /// Create a header for an empty slice with the given capacity
    pub fn new(capacity: usize) -> Self {
        Header {
            length: 0,
            capacity: capacity as i64,
        }
    }

    /// Check `0 <= length <= capacity`
    pub fn validate(&self) -> Result<()> {
        if self.length < 0 || self.capacity < 0 {
            return Err(MappedSliceError::Corrupted(format!(
                "negative header field (length {}, capacity {})",
                self.length, self.capacity
            )));
        }

        if self.length > self.capacity {
            return Err(MappedSliceError::Corrupted(format!(
                "length ({}) exceeds capacity ({})",
                self.length, self.capacity
            )));
        }

        Ok(())
    }

    /// Byte size of a file holding `capacity` slots of `element_size` bytes
    ///
    /// Returns `None` if the size does not fit in a `u64`.
    pub fn file_size(capacity: usize, element_size: usize) -> Option<u64> {
        (capacity as u64)
            .checked_mul(element_size as u64)?
            .checked_add(HEADER_SIZE as u64)
    }

    /// Largest capacity whose file size still fits in a `u64`
    pub fn max_capacity(element_size: usize) -> usize {
        let slots = (u64::MAX - HEADER_SIZE as u64) / element_size.max(1) as u64;
        usize::try_from(slots).unwrap_or(usize::MAX)
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[LENGTH_OFFSET..CAPACITY_OFFSET].copy_from_slice(&self.length.to_ne_bytes());
        bytes[CAPACITY_OFFSET..HEADER_SIZE].copy_from_slice(&self.capacity.to_ne_bytes());
        bytes
    }

    /// Read the header from the start of a mapping
    pub fn read_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(too_short(bytes.len()));
        }

        Ok(Header {
            length: read_i64(bytes, LENGTH_OFFSET),
            capacity: read_i64(bytes, CAPACITY_OFFSET),
        })
    }

    /// Write the header to the start of a mapping
    pub fn write_to(&self, bytes: &mut [u8]) -> Result<()> {
        let len = bytes.len();
        let dst = bytes
            .get_mut(..HEADER_SIZE)
            .ok_or_else(|| too_short(len))?;
        dst.copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// Overwrite only the length field in place
    pub fn write_length(bytes: &mut [u8], length: usize) -> Result<()> {
        write_i64(bytes, LENGTH_OFFSET, length as i64)
    }

    /// Overwrite only the capacity field in place
    pub fn write_capacity(bytes: &mut [u8], capacity: usize) -> Result<()> {
        write_i64(bytes, CAPACITY_OFFSET, capacity as i64)
    }
}

fn too_short(len: usize) -> MappedSliceError {
    MappedSliceError::Corrupted(format!(
        "file is {} bytes, smaller than the {}-byte header",
        len, HEADER_SIZE
    ))
}

fn read_i64(bytes: &[u8], offset: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    i64::from_ne_bytes(raw)
}

fn write_i64(bytes: &mut [u8], offset: usize, value: i64) -> Result<()> {
    let len = bytes.len();
    let dst = bytes
        .get_mut(offset..offset + 8)
        .ok_or_else(|| too_short(len))?;
    dst.copy_from_slice(&value.to_ne_bytes());
    Ok(())
}
