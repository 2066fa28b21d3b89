//! Iteration & Validation
//!
//! Sequential read-only traversal of the live range.

use std::marker::PhantomData;

use crate::error::{Result, TableError};
use crate::layout::RecordLayout;
use crate::record::Record;

/// Iterator over table records in ascending row id order
///
/// The end index is captured when the iterator is created, so it never
/// reads past the live range that existed at that point. Create a new
/// iterator to start over.
pub struct Iter<'a, R: Record> {
    bytes: &'a [u8],
    layout: RecordLayout,
    /// Next slot to read
    index: usize,
    /// Stop before this slot
    end: usize,
    _record: PhantomData<R>,
}

impl<'a, R: Record> Iter<'a, R> {
    pub(crate) fn new(bytes: &'a [u8], layout: RecordLayout, start: usize, end: usize) -> Self {
        Self {
            bytes,
            layout,
            index: start,
            end,
            _record: PhantomData,
        }
    }
}

impl<'a, R: Record> Iterator for Iter<'a, R> {
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let record = self.layout.read(self.bytes, self.index);
        self.index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, R: Record> ExactSizeIterator for Iter<'a, R> {}

/// Check that `row_ids` is strictly ascending.
///
/// Reports the first offending id: `DuplicateRowId` when it equals its
/// predecessor, `OutOfOrder` when it is smaller.
pub fn validate_order(row_ids: impl IntoIterator<Item = i64>) -> Result<()> {
    let mut previous: Option<i64> = None;

    for (index, row_id) in row_ids.into_iter().enumerate() {
        if let Some(prev) = previous {
            if row_id == prev {
                return Err(TableError::DuplicateRowId { index, row_id });
            }
            if row_id < prev {
                return Err(TableError::OutOfOrder {
                    index,
                    previous: prev,
                    row_id,
                });
            }
        }
        previous = Some(row_id);
    }

    Ok(())
}
