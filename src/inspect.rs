//! Inspection
//!
//! Read-only look at a table file without knowing its record type. Only the
//! stride (and, for the key check, where the row id sits in a slot) must be
//! supplied.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Result, TableError};
use crate::iter::validate_order;
use crate::layout::{RecordLayout, HEADER_SIZE};
use crate::storage::page_size;

/// Header-level facts about a table file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub file_len: u64,
    pub page_size: usize,
    pub stride: usize,
    pub count: u64,
    pub capacity: usize,
    /// CRC32 of the header and live records
    pub checksum: u32,
}

impl FileSummary {
    /// Map `path` read-only and summarize it as slots of `stride` bytes
    pub fn read(path: &Path, stride: usize) -> Result<Self> {
        let layout = RecordLayout::new(stride)?;
        let mmap = map_read_only(path)?;
        let count = live_count(path, &layout, &mmap)?;

        Ok(Self {
            path: path.to_path_buf(),
            file_len: mmap.len() as u64,
            page_size: page_size(),
            stride,
            count: count as u64,
            capacity: layout.capacity(mmap.len()),
            checksum: crc32fast::hash(&mmap[..layout.live_len(count)]),
        })
    }

    /// True when the file length is a whole number of host pages
    pub fn is_page_aligned(&self) -> bool {
        self.file_len % self.page_size as u64 == 0
    }
}

/// Check that the `i64` row ids at `key_offset` in each live slot are
/// strictly ascending
pub fn check_keys(path: &Path, stride: usize, key_offset: usize) -> Result<()> {
    let layout = RecordLayout::new(stride)?;
    let key_end = key_offset.checked_add(8).filter(|&end| end <= stride).ok_or_else(|| {
        TableError::Config(format!(
            "key offset {} does not fit an 8-byte row id in a {}-byte stride",
            key_offset, stride
        ))
    })?;

    let mmap = map_read_only(path)?;
    let count = live_count(path, &layout, &mmap)?;

    validate_order((0..count).map(|index| {
        let slot = layout.slot(&mmap, index);
        let mut word = [0u8; 8];
        word.copy_from_slice(&slot[key_offset..key_end]);
        i64::from_ne_bytes(word)
    }))
}

fn map_read_only(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < HEADER_SIZE as u64 {
        return Err(TableError::Storage(format!(
            "{} is {} bytes, shorter than the {}-byte header",
            path.display(),
            len,
            HEADER_SIZE
        )));
    }

    // SAFETY: the mapping is read-only and never outlives the calls in this
    // module. A concurrent writer can change the bytes under us, which yields
    // an inconsistent report but no out-of-bounds read, since slot access is
    // checked against the header count and map length.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

fn live_count(path: &Path, layout: &RecordLayout, bytes: &[u8]) -> Result<usize> {
    let count = RecordLayout::count(bytes);
    let capacity = layout.capacity(bytes.len());
    if count > capacity as u64 {
        return Err(TableError::Storage(format!(
            "{} claims {} records but only {} slots of {} bytes fit",
            path.display(),
            count,
            capacity,
            layout.stride()
        )));
    }
    Ok(count as usize)
}
