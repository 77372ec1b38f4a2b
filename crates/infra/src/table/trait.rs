use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Handle to an opened table: its name plus the header row.
///
/// Column positions come from the header, so callers address cells by column
/// name and resolve the index through [`TableHandle::column_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    name: String,
    header: Vec<String>,
}

impl TableHandle {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|c| c == column)
    }
}

/// One data row, keyed by header column name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    /// Pair header names with cell values. Missing trailing cells read as
    /// empty text; surplus cells without a header are dropped.
    pub fn from_cells(header: &[String], cells: &[String]) -> Self {
        let values = header
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.clone(), cells.get(idx).cloned().unwrap_or_default()))
            .collect();
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Tabular store operation error.
///
/// These are infrastructure failures: the store was unreachable, refused the
/// request, or returned data the caller cannot use.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("row {row} out of range for table '{table}'")]
    RowOutOfRange { table: String, row: usize },

    #[error("column {column} out of range for table '{table}'")]
    ColumnOutOfRange { table: String, column: usize },

    #[error("malformed data: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Row-oriented remote/local table store.
///
/// ## Conventions
///
/// - Every table has a header row; it is never returned as data and never
///   counted by row indexes.
/// - Row indexes are zero-based positions among the data rows, in insertion
///   order.
/// - Cell values are text. Backends must store them verbatim: a serial number
///   like `"00042"` must read back as `"00042"`, not `42`.
/// - No transactions, no conditional writes: last write wins.
pub trait TabularStore: Send + Sync {
    /// Open an existing table.
    fn open_table(&self, name: &str) -> Result<TableHandle, StoreError>;

    /// Create a table with the given header. Creating a table that already
    /// exists returns the existing handle.
    fn create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError>;

    /// All data rows, in insertion order.
    fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, StoreError>;

    /// Append one row (values in header order).
    fn append_row(&self, table: &TableHandle, values: Vec<String>) -> Result<(), StoreError>;

    /// Index of the first data row whose first cell equals `value`.
    fn find_row_by_first_column_value(
        &self,
        table: &TableHandle,
        value: &str,
    ) -> Result<Option<usize>, StoreError>;

    /// Overwrite a single cell in place.
    fn update_cell(
        &self,
        table: &TableHandle,
        row_index: usize,
        column_index: usize,
        value: String,
    ) -> Result<(), StoreError>;

    /// Number of data rows (header excluded).
    fn row_count(&self, table: &TableHandle) -> Result<usize, StoreError> {
        Ok(self.read_all_rows(table)?.len())
    }

    /// Open `name`, creating it with `header` on first use.
    fn ensure_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        match self.open_table(name) {
            Ok(handle) => Ok(handle),
            Err(StoreError::TableNotFound(_)) => {
                tracing::info!(table = name, "creating table");
                self.create_table(name, header)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S> TabularStore for Arc<S>
where
    S: TabularStore + ?Sized,
{
    fn open_table(&self, name: &str) -> Result<TableHandle, StoreError> {
        (**self).open_table(name)
    }

    fn create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        (**self).create_table(name, header)
    }

    fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, StoreError> {
        (**self).read_all_rows(table)
    }

    fn append_row(&self, table: &TableHandle, values: Vec<String>) -> Result<(), StoreError> {
        (**self).append_row(table, values)
    }

    fn find_row_by_first_column_value(
        &self,
        table: &TableHandle,
        value: &str,
    ) -> Result<Option<usize>, StoreError> {
        (**self).find_row_by_first_column_value(table, value)
    }

    fn update_cell(
        &self,
        table: &TableHandle,
        row_index: usize,
        column_index: usize,
        value: String,
    ) -> Result<(), StoreError> {
        (**self).update_cell(table, row_index, column_index, value)
    }

    fn row_count(&self, table: &TableHandle) -> Result<usize, StoreError> {
        (**self).row_count(table)
    }

    fn ensure_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        (**self).ensure_table(name, header)
    }
}
