//! Inventory service (application-level orchestration).
//!
//! Composes the ledger (`items`) and the audit log (`history`) into the
//! operations the UI layer calls:
//!
//! ```text
//! register:  validate → create item row → append REGISTER entry
//! relocate:  validate → overwrite location cell → append RELOCATE entry
//! ```
//!
//! Every mutation is paired with exactly one audit entry. The store has no
//! transactions, so there is no rollback: if the audit append fails after the
//! ledger changed, the ledger keeps the change, the entry is parked in the
//! pending buffer and the caller gets `BackendUnavailable`. The next mutation
//! (or an explicit [`InventoryService::replay_pending_audit`]) writes parked
//! entries first.
//!
//! Validation always happens before any store call.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span, warn};

use equiptrack_auth::Operator;
use equiptrack_core::{Clock, DomainError, ItemId, SystemClock};
use equiptrack_ledger::{
    Catalog, HistoryEntry, Item, NewHistoryEntry, RegisterEquipment, RelocateEquipment,
};

use crate::audit_log::AuditLog;
use crate::ledger_store::{LedgerError, LedgerStore};
use crate::pending::{PendingAudit, PendingAuditBuffer};
use crate::table::{StoreError, TabularStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to the UI layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Input outside an enumerated set, or an empty required field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced item does not exist.
    #[error("not found")]
    NotFound,

    /// The store could not be reached, rejected the request, or returned
    /// unusable data.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        ServiceError::BackendUnavailable(value.to_string())
    }
}

impl From<LedgerError> for ServiceError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotFound(_) => ServiceError::NotFound,
            LedgerError::Store(e) => e.into(),
        }
    }
}

/// The tracker's core: ledger + audit log + input catalog.
///
/// `S` is shared by the ledger and the log, hence `Clone` (typically an
/// `Arc` around a store).
pub struct InventoryService<S> {
    ledger: LedgerStore<S>,
    audit: AuditLog<S>,
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    pending: PendingAuditBuffer,
}

impl<S> core::fmt::Debug for InventoryService<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryService")
            .field("catalog", &self.catalog)
            .field("pending_audit", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<S> InventoryService<S>
where
    S: TabularStore + Clone,
{
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self::with_clock(store, catalog, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: LedgerStore::new(store.clone(), clock.clone()),
            audit: AuditLog::new(store, clock.clone()),
            catalog,
            clock,
            pending: PendingAuditBuffer::new(),
        }
    }

    /// Enumerated sets for edge validation.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list_items(&self, operator: &Operator) -> ServiceResult<Vec<Item>> {
        let _span = info_span!("list_items", operator = operator.login()).entered();
        Ok(self.ledger.list_items()?)
    }

    pub fn find_item_by_id(&self, operator: &Operator, id: ItemId) -> ServiceResult<Item> {
        let _span = info_span!("find_item", operator = operator.login(), item_id = %id).entered();
        Ok(self.ledger.find_item_by_id(id)?)
    }

    /// Full audit log, most recent first.
    pub fn list_history(&self, operator: &Operator) -> ServiceResult<Vec<HistoryEntry>> {
        let _span = info_span!("list_history", operator = operator.login()).entered();
        Ok(self.audit.list_history()?)
    }

    /// Audit entries of one item, most recent first.
    pub fn history_for_item(
        &self,
        operator: &Operator,
        item_id: ItemId,
    ) -> ServiceResult<Vec<HistoryEntry>> {
        let _span =
            info_span!("history_for_item", operator = operator.login(), item_id = %item_id).entered();
        Ok(self.audit.history_for_item(item_id)?)
    }

    /// Register new equipment and log a `REGISTER` entry.
    pub fn register_equipment(
        &self,
        operator: &Operator,
        command: RegisterEquipment,
    ) -> ServiceResult<Item> {
        let _span = info_span!("register_equipment", operator = operator.login()).entered();

        let new = command.validate(&self.catalog)?;
        let item = self.ledger.create_item(new)?;
        info!(
            item_id = %item.id,
            name = %item.name,
            location = %item.location,
            "equipment registered"
        );

        self.record(NewHistoryEntry::registered(&item))?;
        Ok(item)
    }

    /// Move an item and log a `RELOCATE` entry. Returns (before, after).
    pub fn relocate_equipment(
        &self,
        operator: &Operator,
        command: RelocateEquipment,
    ) -> ServiceResult<(Item, Item)> {
        let _span = info_span!(
            "relocate_equipment",
            operator = operator.login(),
            item_id = %command.item_id
        )
        .entered();

        let to = command.validate(&self.catalog)?;
        let (before, after) = self.ledger.relocate_item(command.item_id, to)?;
        info!(
            item_id = %after.id,
            from = %before.location,
            to = %after.location,
            "equipment relocated"
        );

        self.record(NewHistoryEntry::relocated(&before, &after, command.comment.trim()))?;
        Ok((before, after))
    }

    /// Retry audit entries parked by earlier failures. Returns how many were
    /// written; stops at the first failure.
    pub fn replay_pending_audit(&self, operator: &Operator) -> ServiceResult<usize> {
        let _span = info_span!("replay_pending_audit", operator = operator.login()).entered();
        let written = self.flush_pending()?;
        if !written.is_empty() {
            info!(count = written.len(), "replayed pending audit entries");
        }
        Ok(written.len())
    }

    /// Number of audit entries still waiting to be written.
    pub fn pending_audit_len(&self) -> usize {
        self.pending.len()
    }

    /// Park the entry (stamped now) behind any earlier ones, then flush.
    fn record(&self, entry: NewHistoryEntry) -> ServiceResult<()> {
        self.pending.push(PendingAudit {
            entry,
            occurred_at: self.clock.now(),
        });
        self.flush_pending().map(|_| ())
    }

    fn flush_pending(&self) -> ServiceResult<Vec<HistoryEntry>> {
        self.pending
            .drain_with(|p| self.audit.append_at(p.entry.clone(), p.occurred_at))
            .map_err(|(err, written)| {
                warn!(
                    error = %err,
                    written = written.len(),
                    pending = self.pending.len(),
                    "audit append failed; entry kept for replay"
                );
                ServiceError::from(err)
            })
    }
}
