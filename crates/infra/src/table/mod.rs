//! Tabular store boundary.
//!
//! The tracker keeps its state in named tables of text cells with a header
//! row (spreadsheet-style). This module defines the narrow contract the
//! ledger and audit log need, plus two backends: in-memory (tests/dev) and
//! CSV files on disk.

pub mod csv_file;
pub mod in_memory;
pub mod r#trait;

pub use csv_file::CsvTableStore;
pub use in_memory::InMemoryTableStore;
pub use r#trait::{Row, StoreError, TableHandle, TabularStore};
