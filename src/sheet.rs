use std::path::Path;

use tracing::info;

use crate::csv_sheet::CsvSheet;
use crate::db::SqliteSheet;
use crate::error::{LedgerError, Result};
use crate::models::Cell;
use crate::schema::{Columns, DEFAULT_HEADER};
use crate::settings::Backend;

/// A header row plus append-only data rows.
pub trait Sheet {
    /// Header labels; empty when the sheet has never been written.
    fn header(&self) -> Result<Vec<String>>;

    /// Data rows below the header, in insertion order.
    fn rows(&self) -> Result<Vec<Vec<Cell>>>;

    fn append_row(&mut self, row: &[Cell]) -> Result<()>;

    /// Write the header into a sheet that has none.
    fn write_header(&mut self, header: &[String]) -> Result<()>;
}

pub type SharedSheet = Box<dyn Sheet + Send>;

pub fn sheet_file_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Csv => "ledger.csv",
        Backend::Sqlite => "ledger.db",
    }
}

pub fn open_sheet(data_dir: &Path, backend: Backend) -> Result<SharedSheet> {
    let path = data_dir.join(sheet_file_name(backend));
    Ok(match backend {
        Backend::Csv => Box::new(CsvSheet::new(path)),
        Backend::Sqlite => Box::new(SqliteSheet::open(&path)?),
    })
}

/// Give an empty sheet the default header and check an existing one.
pub fn ensure_header(sheet: &mut dyn Sheet) -> Result<Vec<String>> {
    let mut header = sheet.header()?;
    if header.is_empty() {
        header = DEFAULT_HEADER.iter().map(|s| s.to_string()).collect();
        sheet.write_header(&header)?;
        info!(columns = ?header, "initialized sheet header");
    }
    Columns::resolve(&header).validate()?;
    Ok(header)
}

pub(crate) fn header_already_written() -> LedgerError {
    LedgerError::Other("sheet already has a header row".to_string())
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemorySheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[cfg(test)]
impl MemorySheet {
    pub fn with_header(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }
}

#[cfg(test)]
impl Sheet for MemorySheet {
    fn header(&self) -> Result<Vec<String>> {
        Ok(self.header.clone())
    }

    fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, row: &[Cell]) -> Result<()> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn write_header(&mut self, header: &[String]) -> Result<()> {
        if !self.header.is_empty() {
            return Err(header_already_written());
        }
        self.header = header.to_vec();
        Ok(())
    }
}
