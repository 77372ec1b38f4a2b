//! Infrastructure layer: table stores, ledger/audit persistence, the
//! inventory service and configuration.

pub mod audit_log;
pub mod config;
pub mod ledger_store;
pub mod pending;
pub mod service;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use audit_log::{AuditLog, HISTORY_COLUMNS, HISTORY_TABLE};
pub use config::{ConfigError, TrackerConfig};
pub use ledger_store::{ITEM_COLUMNS, ITEMS_TABLE, LedgerError, LedgerStore};
pub use service::{InventoryService, ServiceError, ServiceResult};
pub use table::{CsvTableStore, InMemoryTableStore, StoreError, TabularStore};
