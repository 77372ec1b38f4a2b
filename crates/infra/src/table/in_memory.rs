use std::collections::HashMap;
use std::sync::RwLock;

use super::r#trait::{Row, StoreError, TableHandle, TabularStore};

#[derive(Debug, Default)]
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// In-memory table store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

impl TabularStore for InMemoryTableStore {
    fn open_table(&self, name: &str) -> Result<TableHandle, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        tables
            .get(name)
            .map(|t| TableHandle::new(name, t.header.clone()))
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let table = tables.entry(name.to_string()).or_insert_with(|| Table {
            header: header.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        });
        Ok(TableHandle::new(name, table.header.clone()))
    }

    fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let t = tables
            .get(table.name())
            .ok_or_else(|| StoreError::TableNotFound(table.name().to_string()))?;
        Ok(t.rows.iter().map(|cells| Row::from_cells(&t.header, cells)).collect())
    }

    fn append_row(&self, table: &TableHandle, values: Vec<String>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let t = tables
            .get_mut(table.name())
            .ok_or_else(|| StoreError::TableNotFound(table.name().to_string()))?;
        t.rows.push(values);
        Ok(())
    }

    fn find_row_by_first_column_value(
        &self,
        table: &TableHandle,
        value: &str,
    ) -> Result<Option<usize>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let t = tables
            .get(table.name())
            .ok_or_else(|| StoreError::TableNotFound(table.name().to_string()))?;
        Ok(t
            .rows
            .iter()
            .position(|cells| cells.first().map(String::as_str) == Some(value)))
    }

    fn update_cell(
        &self,
        table: &TableHandle,
        row_index: usize,
        column_index: usize,
        value: String,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let t = tables
            .get_mut(table.name())
            .ok_or_else(|| StoreError::TableNotFound(table.name().to_string()))?;
        if column_index >= t.header.len() {
            return Err(StoreError::ColumnOutOfRange {
                table: table.name().to_string(),
                column: column_index,
            });
        }
        let width = t.header.len();
        let row = t.rows.get_mut(row_index).ok_or_else(|| StoreError::RowOutOfRange {
            table: table.name().to_string(),
            row: row_index,
        })?;
        if row.len() < width {
            row.resize(width, String::new());
        }
        row[column_index] = value;
        Ok(())
    }

    fn row_count(&self, table: &TableHandle) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        tables
            .get(table.name())
            .map(|t| t.rows.len())
            .ok_or_else(|| StoreError::TableNotFound(table.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[&str] = &["id", "name", "location"];

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn missing_table_is_reported() {
        let store = InMemoryTableStore::new();
        assert_eq!(
            store.open_table("items"),
            Err(StoreError::TableNotFound("items".to_string()))
        );
    }

    #[test]
    fn ensure_table_creates_once() {
        let store = InMemoryTableStore::new();
        let a = store.ensure_table("items", HEADER).unwrap();
        store.append_row(&a, cells(&["0", "Mouse", "Office"])).unwrap();

        let b = store.ensure_table("items", &["other"]).unwrap();
        assert_eq!(b.header(), a.header());
        assert_eq!(store.row_count(&b).unwrap(), 1);
    }

    #[test]
    fn find_and_update_cell() {
        let store = InMemoryTableStore::new();
        let t = store.create_table("items", HEADER).unwrap();
        store.append_row(&t, cells(&["0", "Mouse", "Office"])).unwrap();
        store.append_row(&t, cells(&["1", "Monitor", "Warehouse"])).unwrap();

        let idx = store.find_row_by_first_column_value(&t, "1").unwrap();
        assert_eq!(idx, Some(1));
        assert_eq!(store.find_row_by_first_column_value(&t, "9").unwrap(), None);

        store.update_cell(&t, 1, 2, "Repair".to_string()).unwrap();
        let rows = store.read_all_rows(&t).unwrap();
        assert_eq!(rows[1].get("location"), Some("Repair"));
        assert_eq!(rows[1].get("name"), Some("Monitor"));
        assert_eq!(rows[0].get("location"), Some("Office"));
    }

    #[test]
    fn update_out_of_range_is_rejected() {
        let store = InMemoryTableStore::new();
        let t = store.create_table("items", HEADER).unwrap();
        store.append_row(&t, cells(&["0", "Mouse", "Office"])).unwrap();

        assert!(matches!(
            store.update_cell(&t, 5, 0, "x".to_string()),
            Err(StoreError::RowOutOfRange { row: 5, .. })
        ));
        assert!(matches!(
            store.update_cell(&t, 0, 3, "x".to_string()),
            Err(StoreError::ColumnOutOfRange { column: 3, .. })
        ));
    }
}
