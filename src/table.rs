//! Table Module
//!
//! The sorted maintenance engine: a persistent array of fixed-size records
//! kept in strictly ascending row id order.
//!
//! ## Responsibilities
//! - Binary search by row id
//! - Upsert in place, or insert at the tail and restore order with a
//!   backward insertion pass
//! - Delete by position, by row id set, or by predicate
//! - Grow the backing file when capacity runs out
//!
//! ## Header writes
//!
//! Appends keep a working count and write the header once per call, so a
//! bulk append touches the header page a single time.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use tracing::debug;

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::iter::Iter;
use crate::layout::RecordLayout;
use crate::record::Record;
use crate::storage::MappedFile;

/// A memory-mapped, sorted table of `R` records
///
/// ## Concurrency:
/// - No internal locking; one owner mutates a table at a time
/// - `&mut self` on every mutation keeps readers out while slots move
/// - See [`SharedTable`](crate::SharedTable) for in-process sharing
pub struct Table<R: Record> {
    /// Backing file and mapping
    storage: MappedFile,

    /// Offset arithmetic for `R`
    layout: RecordLayout,

    /// Slots available in the current mapping (recomputed after every remap)
    capacity: usize,

    /// Records reserved beyond the immediate need on growth
    growth_slack: usize,

    _record: std::marker::PhantomData<R>,
}

impl<R: Record> Table<R> {
    /// Open or create a table at `path`
    ///
    /// On open:
    /// 1. Create the file if it doesn't exist
    /// 2. Grow it to hold `minimum_capacity` records (never shrink)
    /// 3. Map it and check the header against the mapped capacity
    /// 4. Optionally validate row id order
    pub fn open(path: impl AsRef<Path>, config: TableConfig) -> Result<Self> {
        let layout = RecordLayout::of::<R>()?;
        let minimum_len = Self::byte_len(&layout, config.minimum_capacity)?;

        let storage = MappedFile::open(path.as_ref(), minimum_len, config.use_page_cache)?;

        let mut table = Self {
            storage,
            layout,
            capacity: 0,
            growth_slack: config.growth_slack,
            _record: std::marker::PhantomData,
        };
        table.refresh_capacity()?;

        if config.validate_order {
            table.validate_order()?;
        }

        debug!(
            path = %table.path().display(),
            count = table.len(),
            capacity = table.capacity,
            "opened table"
        );
        Ok(table)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses the default config
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, TableConfig::default())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of live records (0 while shut down)
    pub fn len(&self) -> usize {
        self.storage
            .bytes()
            .map_or(0, |bytes| RecordLayout::count(bytes) as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records the current mapping holds without growing
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    pub fn is_open(&self) -> bool {
        self.storage.is_open()
    }

    /// Copy of the record at `index`, or None past the live range
    pub fn get(&self, index: usize) -> Option<R> {
        let bytes = self.storage.bytes()?;
        if index >= RecordLayout::count(bytes) as usize {
            return None;
        }
        Some(self.layout.read(bytes, index))
    }

    pub fn first(&self) -> Option<R> {
        self.get(0)
    }

    pub fn last(&self) -> Option<R> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Index of the record with `row_id`, exact match only. O(log n).
    pub fn find(&self, row_id: i64) -> Option<usize> {
        let bytes = self.storage.bytes()?;
        self.search(bytes, RecordLayout::count(bytes) as usize, row_id)
            .ok()
    }

    pub fn contains(&self, row_id: i64) -> bool {
        self.find(row_id).is_some()
    }

    /// Record with `row_id`, if present
    pub fn get_by_id(&self, row_id: i64) -> Option<R> {
        self.find(row_id).and_then(|i| self.get(i))
    }

    /// Iterate over all live records in ascending row id order
    pub fn iter(&self) -> Iter<'_, R> {
        self.range(0..usize::MAX)
    }

    /// Iterate over slots `[range.start, range.end)`, clamped to the live range
    pub fn range(&self, range: Range<usize>) -> Iter<'_, R> {
        let count = self.len();
        let end = range.end.min(count);
        let start = range.start.min(end);
        Iter::new(self.storage.bytes().unwrap_or(&[]), self.layout, start, end)
    }

    /// Copy every live record out of the mapping
    pub fn to_vec(&self) -> Vec<R> {
        self.iter().collect()
    }

    /// CRC32 over the header and the live records
    pub fn checksum(&self) -> u32 {
        let bytes = self.storage.bytes().unwrap_or(&[]);
        if bytes.is_empty() {
            return 0;
        }
        let live = self.layout.live_len(RecordLayout::count(bytes) as usize);
        crc32fast::hash(&bytes[..live])
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Overwrite the record at `index` in place.
    ///
    /// Returns false (and writes nothing) if `index` is past the live range
    /// or if `value`'s row id would not sit strictly between its neighbours.
    pub fn set(&mut self, index: usize, value: R) -> bool {
        let layout = self.layout;
        let Some(bytes) = self.storage.bytes_mut() else {
            return false;
        };
        let count = RecordLayout::count(bytes) as usize;
        if index >= count {
            return false;
        }

        let id = value.row_id();
        let after_prev = index == 0 || layout.row_id::<R>(bytes, index - 1) < id;
        let before_next = index + 1 == count || id < layout.row_id::<R>(bytes, index + 1);
        if !(after_prev && before_next) {
            return false;
        }

        layout.write(bytes, index, &value);
        true
    }

    /// Insert `item`, or overwrite the record with the same row id in place
    pub fn append(&mut self, item: R) -> Result<()> {
        self.append_all(std::slice::from_ref(&item))
    }

    /// Upsert every item in input order.
    ///
    /// Capacity is checked once for the whole batch and the header is
    /// written once at the end.
    pub fn append_all(&mut self, items: &[R]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let count = self.len_checked()?;
        let needed = count.checked_add(items.len()).ok_or_else(|| {
            TableError::Storage(format!("cannot hold {} + {} records", count, items.len()))
        })?;
        if needed > self.capacity {
            self.grow_to(needed)?;
        }

        let layout = self.layout;
        let bytes = self.storage.bytes_mut().ok_or(TableError::Closed)?;
        let mut working = count;

        for item in items {
            match Self::search_in(&layout, bytes, working, item.row_id()) {
                Ok(index) => layout.write(bytes, index, item),
                Err(_) => {
                    layout.write(bytes, working, item);
                    Self::sift_back(&layout, bytes, working);
                    working += 1;
                }
            }
        }

        if working != count {
            RecordLayout::set_count(bytes, working as u64);
        }
        Ok(())
    }

    /// Remove the record at `index`. No-op past the live range.
    pub fn delete_at(&mut self, index: usize) {
        let layout = self.layout;
        let Some(bytes) = self.storage.bytes_mut() else {
            return;
        };
        let count = RecordLayout::count(bytes) as usize;
        if index >= count {
            return;
        }

        if index + 1 < count {
            layout.shift_down(bytes, index, count);
        }
        RecordLayout::set_count(bytes, (count - 1) as u64);
    }

    /// Remove every record whose row id is in `ids`. Returns how many were removed.
    pub fn delete_entries(&mut self, ids: &HashSet<i64>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.delete_all(|record| ids.contains(&record.row_id()))
    }

    /// Remove every record matching `predicate`. Returns how many were removed.
    ///
    /// Positions are visited from the highest live index down to 0. A delete
    /// only shifts slots above it, so the indices still to be visited stay
    /// valid throughout the pass.
    pub fn delete_all<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&R) -> bool,
    {
        let mut removed = 0;
        for index in (0..self.len()).rev() {
            let Some(record) = self.get(index) else {
                continue;
            };
            if predicate(&record) {
                self.delete_at(index);
                removed += 1;
            }
        }
        removed
    }

    /// Ensure room for `additional` more records without further growth
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let count = self.len_checked()?;
        let needed = count.checked_add(additional).ok_or_else(|| {
            TableError::Storage(format!("cannot hold {} + {} records", count, additional))
        })?;
        if needed > self.capacity {
            self.grow_to(needed)?;
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Synchronize the mapping to disk without closing
    pub fn flush(&self) -> Result<()> {
        self.storage.flush()
    }

    /// Flush, unmap and close. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        self.capacity = 0;
        self.storage.close()
    }

    /// Re-map the backing file at its current size, recovering its content
    pub fn resume(&mut self) -> Result<()> {
        self.storage.reopen()?;
        self.refresh_capacity()?;
        debug!(path = %self.path().display(), count = self.len(), "resumed table");
        Ok(())
    }

    /// Walk the live range and fail on the first duplicate or out-of-order row id
    pub fn validate_order(&self) -> Result<()> {
        crate::iter::validate_order(self.iter().map(|r| r.row_id()))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn len_checked(&self) -> Result<usize> {
        if !self.storage.is_open() {
            return Err(TableError::Closed);
        }
        Ok(self.len())
    }

    fn byte_len(layout: &RecordLayout, capacity: usize) -> Result<usize> {
        layout.byte_len(capacity).ok_or_else(|| {
            TableError::Storage(format!("capacity of {} records overflows", capacity))
        })
    }

    /// Grow to hold `needed` records plus the configured slack
    fn grow_to(&mut self, needed: usize) -> Result<()> {
        let target = needed.saturating_add(self.growth_slack);
        let minimum_len = Self::byte_len(&self.layout, target)?;
        self.storage.grow(minimum_len)?;
        self.refresh_capacity()?;

        debug!(
            path = %self.path().display(),
            needed,
            capacity = self.capacity,
            "grew table"
        );
        Ok(())
    }

    /// Recompute capacity from the mapping and check the header fits inside it
    fn refresh_capacity(&mut self) -> Result<()> {
        let capacity = self.layout.capacity(self.storage.len());
        let count = self.len();
        if count > capacity {
            let path = self.path().display().to_string();
            self.capacity = 0;
            self.storage.close()?;
            return Err(TableError::Storage(format!(
                "{} claims {} records but only {} fit in the file",
                path, count, capacity
            )));
        }
        self.capacity = capacity;
        Ok(())
    }

    fn search(&self, bytes: &[u8], count: usize, row_id: i64) -> std::result::Result<usize, usize> {
        Self::search_in(&self.layout, bytes, count, row_id)
    }

    /// Binary search over `[0, count)`: Ok(index) on a match, Err(insertion point) otherwise
    fn search_in(
        layout: &RecordLayout,
        bytes: &[u8],
        count: usize,
        row_id: i64,
    ) -> std::result::Result<usize, usize> {
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let probe = layout.row_id::<R>(bytes, mid);
            if probe == row_id {
                return Ok(mid);
            }
            if probe < row_id {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Err(lo)
    }

    /// Backward insertion pass: swap slot `index` with its predecessor while
    /// the predecessor's row id is greater
    fn sift_back(layout: &RecordLayout, bytes: &mut [u8], mut index: usize) {
        let id = layout.row_id::<R>(bytes, index);
        while index > 0 && layout.row_id::<R>(bytes, index - 1) > id {
            layout.swap(bytes, index - 1, index);
            index -= 1;
        }
    }
}

impl<'a, R: Record> IntoIterator for &'a Table<R> {
    type Item = R;
    type IntoIter = Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R: Record> std::fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("path", &self.path())
            .field("count", &self.len())
            .field("capacity", &self.capacity)
            .field("stride", &self.layout.stride())
            .finish()
    }
}
