//! The `items` table: current state of every tracked piece of equipment.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;

use equiptrack_core::{Clock, ItemId};
use equiptrack_ledger::{Item, ItemStatus, ItemType, Location, NewItem};

use crate::table::{Row, StoreError, TableHandle, TabularStore};

pub const ITEMS_TABLE: &str = "items";

/// Header of the `items` table. `id` must stay first: relocation finds rows
/// by first-column value.
pub const ITEM_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "item_type",
    "serial_number",
    "specs",
    "location",
    "status",
    "created_at",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CRUD-lite access to the item collection.
pub struct LedgerStore<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S> core::fmt::Debug for LedgerStore<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedgerStore").finish_non_exhaustive()
    }
}

impl<S: TabularStore> LedgerStore<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn table(&self) -> Result<TableHandle, StoreError> {
        self.store.ensure_table(ITEMS_TABLE, &ITEM_COLUMNS)
    }

    /// All items in insertion order.
    pub fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let table = self.table()?;
        self.store
            .read_all_rows(&table)?
            .iter()
            .map(item_from_row)
            .collect()
    }

    /// First item whose stored id text equals `id`.
    pub fn find_item_by_id(&self, id: ItemId) -> Result<Item, LedgerError> {
        let table = self.table()?;
        let wanted = id.as_cell();
        let rows = self.store.read_all_rows(&table)?;
        let row = rows
            .iter()
            .find(|row| row.get("id") == Some(wanted.as_str()))
            .ok_or(LedgerError::NotFound(id))?;
        Ok(item_from_row(row)?)
    }

    /// Append a new item. Its id is the number of data rows already present.
    pub fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
        let table = self.table()?;
        let id = ItemId::from_row_count(self.store.row_count(&table)?);
        // Stored at second precision; truncate so the returned value matches
        // what later reads produce.
        let created_at = self.clock.now().trunc_subsecs(0);
        let item = Item::from_new(id, new, created_at);

        self.store.append_row(&table, item_to_cells(&item))?;
        Ok(item)
    }

    /// Overwrite the location cell of one item; returns (before, after).
    pub fn relocate_item(&self, id: ItemId, to: Location) -> Result<(Item, Item), LedgerError> {
        let table = self.table()?;
        let before = self.find_item_by_id(id)?;
        let row_index = self
            .store
            .find_row_by_first_column_value(&table, &id.as_cell())?
            .ok_or(LedgerError::NotFound(id))?;
        let column = table
            .column_index("location")
            .ok_or_else(|| StoreError::malformed("items table has no 'location' column"))?;

        self.store
            .update_cell(&table, row_index, column, to.as_str().to_string())?;
        let after = before.relocated(to);
        Ok((before, after))
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(column: &str, text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::malformed(format!("{column} '{text}': {e}")))
}

pub(crate) fn cell<'a>(row: &'a Row, column: &str) -> Result<&'a str, StoreError> {
    row.get(column)
        .ok_or_else(|| StoreError::malformed(format!("missing column '{column}'")))
}

fn item_to_cells(item: &Item) -> Vec<String> {
    vec![
        item.id.as_cell(),
        item.name.clone(),
        item.item_type.as_str().to_string(),
        item.serial_number.clone(),
        item.specs.clone(),
        item.location.as_str().to_string(),
        item.status.as_str().to_string(),
        format_timestamp(item.created_at),
    ]
}

fn item_from_row(row: &Row) -> Result<Item, StoreError> {
    let id = cell(row, "id")?
        .parse::<ItemId>()
        .map_err(|e| StoreError::malformed(e.to_string()))?;
    let status = cell(row, "status")?
        .parse::<ItemStatus>()
        .map_err(|e| StoreError::malformed(e.to_string()))?;

    Ok(Item {
        id,
        name: cell(row, "name")?.to_string(),
        item_type: ItemType::from_cell(cell(row, "item_type")?),
        serial_number: cell(row, "serial_number")?.to_string(),
        specs: cell(row, "specs")?.to_string(),
        location: Location::from_cell(cell(row, "location")?),
        status,
        created_at: parse_timestamp("created_at", cell(row, "created_at")?)?,
    })
}
