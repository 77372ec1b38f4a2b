//! Fault-injecting store wrapper for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::table::{Row, StoreError, TableHandle, TabularStore};

/// Wraps a store and fails calls on demand: everything while "down", or only
/// appends to one named table.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    down: AtomicBool,
    failing_appends: Mutex<Option<String>>,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
            failing_appends: Mutex::new(None),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn fail_appends_to(&self, table: Option<&str>) {
        *self.failing_appends.lock().unwrap() = table.map(str::to_string);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        Ok(())
    }
}

impl<S: TabularStore> TabularStore for FlakyStore<S> {
    fn open_table(&self, name: &str) -> Result<TableHandle, StoreError> {
        self.check()?;
        self.inner.open_table(name)
    }

    fn create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        self.check()?;
        self.inner.create_table(name, header)
    }

    fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, StoreError> {
        self.check()?;
        self.inner.read_all_rows(table)
    }

    fn append_row(&self, table: &TableHandle, values: Vec<String>) -> Result<(), StoreError> {
        self.check()?;
        if self.failing_appends.lock().unwrap().as_deref() == Some(table.name()) {
            return Err(StoreError::backend(format!("append to '{}' rejected", table.name())));
        }
        self.inner.append_row(table, values)
    }

    fn find_row_by_first_column_value(
        &self,
        table: &TableHandle,
        value: &str,
    ) -> Result<Option<usize>, StoreError> {
        self.check()?;
        self.inner.find_row_by_first_column_value(table, value)
    }

    fn update_cell(
        &self,
        table: &TableHandle,
        row_index: usize,
        column_index: usize,
        value: String,
    ) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update_cell(table, row_index, column_index, value)
    }
}
