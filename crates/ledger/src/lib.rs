//! Equipment ledger domain module.
//!
//! Business rules for tracked equipment and its audit trail, implemented as
//! plain domain logic (no IO, no storage). Storage lives in `equiptrack-infra`.

pub mod catalog;
pub mod history;
pub mod item;

pub use catalog::{Catalog, ItemStatus, ItemType, Location};
pub use history::{AuditAction, HistoryEntry, NewHistoryEntry};
pub use item::{Item, NewItem, RegisterEquipment, RelocateEquipment};
