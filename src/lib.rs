//! # rowtable
//!
//! An embedded, persistent table of fixed-size records with:
//! - A single growable memory-mapped file per table
//! - Records kept in strictly ascending row id order
//! - Upsert, point and bulk delete, binary-search lookup
//! - Forward iteration and an optional order check on open
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Table<R>                              │
//! │      find / append / append_all / delete_* / iter           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │RecordLayout │          │  Iter /     │
//!   │ (offsets)   │◄─────────│  validate   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ MappedFile  │
//!   │ (fd + mmap) │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let mut table: Table<Trade> = Table::open("trades.tbl", TableConfig::default())?;
//! table.append(Trade { row_id: 7, price: 100, qty: 3 })?;
//! assert_eq!(table.find(7), Some(0));
//! table.shutdown()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod layout;
pub mod table;
pub mod iter;
pub mod shared;
pub mod inspect;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TableError, Result};
pub use config::TableConfig;
pub use record::Record;
pub use table::Table;
pub use shared::SharedTable;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rowtable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
