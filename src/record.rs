//! Record capability
//!
//! Records are persisted as their raw in-memory bytes and reloaded by later
//! processes, so a record type must be fixed-size and free of pointers,
//! references or owned heap data. The zerocopy bounds enforce this at
//! compile time: `FromBytes` rules out references and niches, and `IntoBytes`
//! rules out implicit padding, so `size_of::<R>()` is exactly the on-disk
//! stride.
//!
//! ```ignore
//! use rowtable::Record;
//! use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
//!
//! #[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
//! #[repr(C)]
//! struct Trade {
//!     row_id: i64,
//!     price: u32,
//!     qty: u32,
//! }
//!
//! impl Record for Trade {
//!     fn row_id(&self) -> i64 {
//!         self.row_id
//!     }
//! }
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A fixed-layout value stored in a table, ordered by its row id
pub trait Record: FromBytes + IntoBytes + Immutable + KnownLayout + Copy {
    /// The unique sort key of this record
    fn row_id(&self) -> i64;
}
