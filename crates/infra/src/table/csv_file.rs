use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use super::r#trait::{Row, StoreError, TableHandle, TabularStore};

/// File-backed table store: one `<table>.csv` per table inside a directory.
///
/// The first CSV record is the header. A missing or empty file is a table
/// that does not exist yet. Every field is written quoted and read back as
/// text, so serials like `00042` keep their leading zeros here (a spreadsheet
/// opening the file may still convert them). Cell updates rewrite the file
/// through a temporary sibling and a rename.
#[derive(Debug)]
pub struct CsvTableStore {
    dir: PathBuf,
    // Serializes file access within this process; other processes are not
    // coordinated (last write wins).
    io_lock: Mutex<()>,
}

impl CsvTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            io_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.io_lock
            .lock()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    /// Read every record of a table file, header first.
    fn read_records(&self, name: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let path = self.path_for(name);
        if !self.has_content(name)? {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| StoreError::backend(format!("open {}: {e}", path.display())))?;

        reader
            .records()
            .map(|record| {
                record
                    .map(|r| record_to_cells(&r))
                    .map_err(|e| StoreError::backend(format!("read {}: {e}", path.display())))
            })
            .collect()
    }

    /// `false` for a missing or zero-length file.
    fn has_content(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(name);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::backend(format!("stat {}: {e}", path.display()))),
        }
    }

    fn write_records(&self, name: &str, records: &[Vec<String>]) -> Result<(), StoreError> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!("{name}.csv.tmp"));
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .quote_style(QuoteStyle::Always)
                .from_path(&tmp)
                .map_err(|e| StoreError::backend(format!("create {}: {e}", tmp.display())))?;
            for record in records {
                writer
                    .write_record(record)
                    .map_err(|e| StoreError::backend(format!("write {}: {e}", tmp.display())))?;
            }
            writer
                .flush()
                .map_err(|e| StoreError::backend(format!("flush {}: {e}", tmp.display())))?;
        }
        fs::rename(&tmp, &path)
            .map_err(|e| StoreError::backend(format!("replace {}: {e}", path.display())))
    }

    fn header_of(records: &[Vec<String>], name: &str) -> Result<Vec<String>, StoreError> {
        records
            .first()
            .cloned()
            .ok_or_else(|| StoreError::malformed(format!("table '{name}' has no header row")))
    }
}

fn record_to_cells(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl TabularStore for CsvTableStore {
    fn open_table(&self, name: &str) -> Result<TableHandle, StoreError> {
        let _guard = self.lock()?;
        let records = self.read_records(name)?;
        let header = Self::header_of(&records, name)?;
        Ok(TableHandle::new(name, header))
    }

    fn create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle, StoreError> {
        let _guard = self.lock()?;
        if self.has_content(name)? {
            let records = self.read_records(name)?;
            return Ok(TableHandle::new(name, Self::header_of(&records, name)?));
        }
        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::backend(format!("create {}: {e}", self.dir.display())))?;
        let header: Vec<String> = header.iter().map(|c| c.to_string()).collect();
        self.write_records(name, std::slice::from_ref(&header))?;
        Ok(TableHandle::new(name, header))
    }

    fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, StoreError> {
        let _guard = self.lock()?;
        let records = self.read_records(table.name())?;
        tracing::debug!(table = table.name(), rows = records.len().saturating_sub(1), "read table");
        Ok(records
            .iter()
            .skip(1)
            .map(|cells| Row::from_cells(table.header(), cells))
            .collect())
    }

    fn append_row(&self, table: &TableHandle, values: Vec<String>) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let path = self.path_for(table.name());
        if !self.has_content(table.name())? {
            return Err(StoreError::TableNotFound(table.name().to_string()));
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::backend(format!("open {}: {e}", path.display())))?;
        // Files saved by spreadsheet tools often lack the final line break.
        if !ends_with_newline(&mut file)
            .map_err(|e| StoreError::backend(format!("read {}: {e}", path.display())))?
        {
            file.write_all(b"\n")
                .map_err(|e| StoreError::backend(format!("append {}: {e}", path.display())))?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        writer
            .write_record(&values)
            .map_err(|e| StoreError::backend(format!("append {}: {e}", path.display())))?;
        writer
            .flush()
            .map_err(|e| StoreError::backend(format!("flush {}: {e}", path.display())))?;

        let mut file = writer
            .into_inner()
            .map_err(|e| StoreError::backend(format!("flush {}: {e}", path.display())))?;
        file.sync_data()
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::backend(format!("sync {}: {e}", path.display())))
    }

    fn find_row_by_first_column_value(
        &self,
        table: &TableHandle,
        value: &str,
    ) -> Result<Option<usize>, StoreError> {
        let _guard = self.lock()?;
        let records = self.read_records(table.name())?;
        Ok(records
            .iter()
            .skip(1)
            .position(|cells| cells.first().map(String::as_str) == Some(value)))
    }

    fn update_cell(
        &self,
        table: &TableHandle,
        row_index: usize,
        column_index: usize,
        value: String,
    ) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut records = self.read_records(table.name())?;
        let width = Self::header_of(&records, table.name())?.len();
        if column_index >= width {
            return Err(StoreError::ColumnOutOfRange {
                table: table.name().to_string(),
                column: column_index,
            });
        }
        // +1 skips the header record.
        let row = records
            .get_mut(row_index + 1)
            .ok_or_else(|| StoreError::RowOutOfRange {
                table: table.name().to_string(),
                row: row_index,
            })?;
        if row.len() < width {
            row.resize(width, String::new());
        }
        row[column_index] = value;
        self.write_records(table.name(), &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[&str] = &["id", "serial_number", "location"];

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn tables_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = CsvTableStore::new(dir.path());
            let t = store.ensure_table("items", HEADER).unwrap();
            store.append_row(&t, cells(&["0", "00042", "Office"])).unwrap();
        }

        let store = CsvTableStore::new(dir.path());
        let t = store.open_table("items").unwrap();
        assert_eq!(t.header(), &cells(HEADER)[..]);
        let rows = store.read_all_rows(&t).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("serial_number"), Some("00042"));
    }

    #[test]
    fn fields_are_written_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::new(dir.path());
        let t = store.ensure_table("items", HEADER).unwrap();
        store.append_row(&t, cells(&["0", "0017", "Site, North"])).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("items.csv")).unwrap();
        assert!(raw.contains("\"0017\""));
        let rows = store.read_all_rows(&t).unwrap();
        assert_eq!(rows[0].get("location"), Some("Site, North"));
    }

    #[test]
    fn update_cell_rewrites_only_that_cell() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::new(dir.path());
        let t = store.ensure_table("items", HEADER).unwrap();
        store.append_row(&t, cells(&["0", "A1", "Office"])).unwrap();
        store.append_row(&t, cells(&["1", "B2", "Warehouse"])).unwrap();

        let idx = store.find_row_by_first_column_value(&t, "1").unwrap().unwrap();
        store.update_cell(&t, idx, 2, "Repair".to_string()).unwrap();

        let rows = store.read_all_rows(&t).unwrap();
        assert_eq!(rows[0].get("location"), Some("Office"));
        assert_eq!(rows[1].get("location"), Some("Repair"));
        assert_eq!(rows[1].get("serial_number"), Some("B2"));
        assert!(!dir.path().join("items.csv.tmp").exists());
    }

    #[test]
    fn append_after_unterminated_last_line_starts_a_new_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.csv"), "id,name\n0,Mouse").unwrap();
        let store = CsvTableStore::new(dir.path());
        let t = store.open_table("items").unwrap();

        store.append_row(&t, cells(&["1", "Monitor"])).unwrap();

        let rows = store.read_all_rows(&t).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("Mouse"));
        assert_eq!(rows[1].get("id"), Some("1"));
        assert_eq!(rows[1].get("name"), Some("Monitor"));
        assert_eq!(store.row_count(&t).unwrap(), 2);
    }

    #[test]
    fn empty_file_gets_its_header_on_ensure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.csv"), "").unwrap();
        let store = CsvTableStore::new(dir.path());
        assert!(matches!(store.open_table("items"), Err(StoreError::TableNotFound(_))));

        let t = store.ensure_table("items", HEADER).unwrap();
        assert_eq!(t.header(), &cells(HEADER)[..]);
        store.append_row(&t, cells(&["0", "A1", "Office"])).unwrap();
        assert_eq!(store.row_count(&t).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_table_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::new(dir.path().join("nested"));
        assert!(matches!(store.open_table("history"), Err(StoreError::TableNotFound(_))));
        // ensure_table creates the directory as well.
        let t = store.ensure_table("history", &["id"]).unwrap();
        assert_eq!(store.row_count(&t).unwrap(), 0);
    }
}
