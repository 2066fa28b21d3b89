//! Record Layout
//!
//! Pure address arithmetic over a table's mapped bytes. Every index to byte
//! offset conversion in the crate goes through [`RecordLayout`].
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                         │
//! │   Count: u64, native endian                              │
//! ├──────────────────────────────────────────────────────────┤
//! │ Slot 0 .. Slot count-1      live records, ascending id   │
//! │   [record bytes, `stride` each, natural layout]          │
//! ├──────────────────────────────────────────────────────────┤
//! │ Slot count .. Slot capacity-1   stale, never read        │
//! ├──────────────────────────────────────────────────────────┤
//! │ Tail padding up to the next page boundary                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The count is always eight bytes wide regardless of the host word size so
//! files stay readable across builds.

use std::mem::size_of;

use zerocopy::{FromZeros, IntoBytes};

use crate::error::{Result, TableError};
use crate::record::Record;

/// Size of the record count header at byte 0
pub const HEADER_SIZE: usize = size_of::<u64>();

/// Offset arithmetic for one record stride
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    stride: usize,
}

impl RecordLayout {
    /// Layout for slots of `stride` bytes. A zero stride is rejected.
    pub fn new(stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(TableError::Config(
                "record stride must be at least one byte".to_string(),
            ));
        }
        Ok(Self { stride })
    }

    /// Layout matching the in-memory size of `R`
    pub fn of<R: Record>() -> Result<Self> {
        Self::new(size_of::<R>())
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset of slot `index`
    pub fn offset(&self, index: usize) -> usize {
        HEADER_SIZE + index * self.stride
    }

    /// Bytes needed for the header plus `capacity` slots, or None on overflow
    pub fn byte_len(&self, capacity: usize) -> Option<usize> {
        capacity.checked_mul(self.stride)?.checked_add(HEADER_SIZE)
    }

    /// Whole slots that fit in a region of `len` bytes
    pub fn capacity(&self, len: usize) -> usize {
        len.saturating_sub(HEADER_SIZE) / self.stride
    }

    /// Byte length of the header plus `count` live records
    pub fn live_len(&self, count: usize) -> usize {
        self.offset(count)
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Read the record count stored in the header
    pub fn count(bytes: &[u8]) -> u64 {
        let mut word = [0u8; HEADER_SIZE];
        word.copy_from_slice(&bytes[..HEADER_SIZE]);
        u64::from_ne_bytes(word)
    }

    /// Overwrite the record count stored in the header
    pub fn set_count(bytes: &mut [u8], count: u64) {
        bytes[..HEADER_SIZE].copy_from_slice(&count.to_ne_bytes());
    }

    // =========================================================================
    // Slots
    // =========================================================================

    pub fn slot<'a>(&self, bytes: &'a [u8], index: usize) -> &'a [u8] {
        let start = self.offset(index);
        &bytes[start..start + self.stride]
    }

    pub fn slot_mut<'a>(&self, bytes: &'a mut [u8], index: usize) -> &'a mut [u8] {
        let start = self.offset(index);
        &mut bytes[start..start + self.stride]
    }

    /// Copy the record in slot `index` out of the mapping.
    ///
    /// Slots carry no alignment guarantee, so the bytes are copied into a
    /// properly aligned value rather than reinterpreted in place.
    pub fn read<R: Record>(&self, bytes: &[u8], index: usize) -> R {
        let mut value = R::new_zeroed();
        value.as_mut_bytes().copy_from_slice(self.slot(bytes, index));
        value
    }

    /// Store `value` into slot `index`
    pub fn write<R: Record>(&self, bytes: &mut [u8], index: usize, value: &R) {
        self.slot_mut(bytes, index).copy_from_slice(value.as_bytes());
    }

    /// Row id of the record in slot `index`
    pub fn row_id<R: Record>(&self, bytes: &[u8], index: usize) -> i64 {
        self.read::<R>(bytes, index).row_id()
    }

    /// Exchange the contents of two slots
    pub fn swap(&self, bytes: &mut [u8], a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = bytes.split_at_mut(self.offset(hi));
        head[self.offset(lo)..self.offset(lo) + self.stride]
            .swap_with_slice(&mut tail[..self.stride]);
    }

    /// Move slots `[index + 1, count)` down into `[index, count - 1)` in one copy
    pub fn shift_down(&self, bytes: &mut [u8], index: usize, count: usize) {
        if index + 1 >= count {
            return;
        }
        bytes.copy_within(self.offset(index + 1)..self.offset(count), self.offset(index));
    }
}
