//! The `history` table: append-only record of register/relocate actions.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use equiptrack_core::{Clock, EntryId, ItemId};
use equiptrack_ledger::{AuditAction, HistoryEntry, Location, NewHistoryEntry};

use crate::ledger_store::{cell, format_timestamp, parse_timestamp};
use crate::table::{Row, StoreError, TableHandle, TabularStore};

pub const HISTORY_TABLE: &str = "history";

pub const HISTORY_COLUMNS: [&str; 8] = [
    "id",
    "action",
    "item_id",
    "item_name",
    "from_location",
    "to_location",
    "date_time",
    "comment",
];

/// Append-only access to the audit trail. There is deliberately no update or
/// delete.
pub struct AuditLog<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S> core::fmt::Debug for AuditLog<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl<S: TabularStore> AuditLog<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn table(&self) -> Result<TableHandle, StoreError> {
        self.store.ensure_table(HISTORY_TABLE, &HISTORY_COLUMNS)
    }

    /// Append an entry stamped with the current time.
    pub fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        let now = self.clock.now();
        self.append_at(entry, now)
    }

    /// Append an entry whose action happened at `date_time` (replays of
    /// buffered entries keep their original time). The id is still the row
    /// count at the moment of writing.
    pub fn append_at(
        &self,
        entry: NewHistoryEntry,
        date_time: DateTime<Utc>,
    ) -> Result<HistoryEntry, StoreError> {
        let table = self.table()?;
        let id = EntryId::from_row_count(self.store.row_count(&table)?);
        let committed = HistoryEntry::from_new(id, entry, date_time.trunc_subsecs(0));

        self.store.append_row(&table, entry_to_cells(&committed))?;
        tracing::debug!(
            entry_id = %committed.id,
            action = %committed.action,
            item_id = %committed.item_id,
            "audit entry appended"
        );
        Ok(committed)
    }

    /// Every entry, most recent first.
    pub fn list_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let table = self.table()?;
        let mut entries = self
            .store
            .read_all_rows(&table)?
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }

    /// Entries referring to one item, most recent first.
    pub fn history_for_item(&self, item_id: ItemId) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .list_history()?
            .into_iter()
            .filter(|e| e.item_id == item_id)
            .collect())
    }
}

fn entry_to_cells(entry: &HistoryEntry) -> Vec<String> {
    vec![
        entry.id.as_cell(),
        entry.action.as_str().to_string(),
        entry.item_id.as_cell(),
        entry.item_name.clone(),
        entry
            .from_location
            .as_ref()
            .map(|l| l.as_str().to_string())
            .unwrap_or_default(),
        entry.to_location.as_str().to_string(),
        format_timestamp(entry.date_time),
        entry.comment.clone(),
    ]
}

fn entry_from_row(row: &Row) -> Result<HistoryEntry, StoreError> {
    let malformed = |e: equiptrack_core::DomainError| StoreError::malformed(e.to_string());

    let from = cell(row, "from_location")?;
    Ok(HistoryEntry {
        id: cell(row, "id")?.parse::<EntryId>().map_err(malformed)?,
        action: cell(row, "action")?.parse::<AuditAction>().map_err(malformed)?,
        item_id: cell(row, "item_id")?.parse::<ItemId>().map_err(malformed)?,
        item_name: cell(row, "item_name")?.to_string(),
        from_location: (!from.is_empty()).then(|| Location::from_cell(from)),
        to_location: Location::from_cell(cell(row, "to_location")?),
        date_time: parse_timestamp("date_time", cell(row, "date_time")?)?,
        comment: cell(row, "comment")?.to_string(),
    })
}
