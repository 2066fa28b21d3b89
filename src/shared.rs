//! Shared Table
//!
//! In-process single-writer / multi-reader access to one table.
//!
//! `Table` does no locking of its own. `SharedTable` puts it behind a
//! `parking_lot::RwLock` so several threads can read concurrently while
//! mutations are serialized. It does nothing for other processes mapping
//! the same file.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::TableConfig;
use crate::error::Result;
use crate::record::Record;
use crate::table::Table;

/// Cloneable handle to a table guarded by a read/write lock
pub struct SharedTable<R: Record> {
    inner: Arc<RwLock<Table<R>>>,
}

impl<R: Record> SharedTable<R> {
    /// Open a table and wrap it for sharing
    pub fn open(path: impl AsRef<Path>, config: TableConfig) -> Result<Self> {
        Ok(Self::new(Table::open(path, config)?))
    }

    pub fn new(table: Table<R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Run `f` with shared access (many readers at once)
    pub fn read<T>(&self, f: impl FnOnce(&Table<R>) -> T) -> T {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access
    pub fn write<T>(&self, f: impl FnOnce(&mut Table<R>) -> T) -> T {
        f(&mut self.inner.write())
    }

    pub fn len(&self) -> usize {
        self.read(|t| t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_by_id(&self, row_id: i64) -> Option<R> {
        self.read(|t| t.get_by_id(row_id))
    }

    pub fn append(&self, item: R) -> Result<()> {
        self.write(|t| t.append(item))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.write(|t| t.shutdown())
    }
}

impl<R: Record> Clone for SharedTable<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
