//! Shared fixtures for rowtable integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use rowtable::{Record, Table, TableConfig};
use tempfile::TempDir;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

// =============================================================================
// Record Types
// =============================================================================

/// 16-byte aligned record
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Row {
    pub row_id: i64,
    pub value: u32,
    pub flags: u32,
}

impl Record for Row {
    fn row_id(&self) -> i64 {
        self.row_id
    }
}

/// 11-byte packed record, so slots are never naturally aligned
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Tick {
    pub id: i64,
    pub side: u8,
    pub price: u16,
}

impl Record for Tick {
    fn row_id(&self) -> i64 {
        self.id
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

pub fn row(id: i64) -> Row {
    Row {
        row_id: id,
        value: (id as u32).wrapping_mul(7),
        flags: 0,
    }
}

pub fn row_with_value(id: i64, value: u32) -> Row {
    Row {
        row_id: id,
        value,
        flags: 1,
    }
}

pub fn tick(id: i64) -> Tick {
    Tick {
        id,
        side: (id & 1) as u8,
        price: (id as u16).wrapping_mul(3),
    }
}

pub fn setup_temp_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rows.tbl");
    (temp_dir, path)
}

pub fn setup_temp_table() -> (TempDir, PathBuf, Table<Row>) {
    let (temp_dir, path) = setup_temp_path();
    let table = Table::open(&path, TableConfig::default()).unwrap();
    (temp_dir, path, table)
}

pub fn setup_table_with_ids(ids: impl IntoIterator<Item = i64>) -> (TempDir, PathBuf, Table<Row>) {
    let (temp_dir, path, mut table) = setup_temp_table();
    let rows: Vec<Row> = ids.into_iter().map(row).collect();
    table.append_all(&rows).unwrap();
    (temp_dir, path, table)
}

pub fn ids<R: Record>(table: &Table<R>) -> Vec<i64> {
    table.iter().map(|r| r.row_id()).collect()
}

pub fn assert_strictly_ascending<R: Record>(table: &Table<R>) {
    let ids = ids(table);
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "ids not ascending: {:?}", ids);
    }
    assert!(table.validate_order().is_ok());
}
