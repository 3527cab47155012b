use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::Result;
use crate::models::Cell;
use crate::sheet::{header_already_written, Sheet};

/// Sheet stored as a plain CSV file: first record is the header.
///
/// Every cell reads back as text, so dates and amounts go through the same
/// parsing as a hand-edited spreadsheet export.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn records(&self) -> Result<Vec<StringRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut out = Vec::new();
        for record in rdr.records() {
            out.push(record?);
        }
        Ok(out)
    }

    fn write_record<I, T>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline(&mut file)? {
            std::io::Write::write_all(&mut file, b"\n")?;
        }
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(file);
        wtr.write_record(fields)?;
        wtr.flush()?;
        Ok(())
    }
}

/// True when the file is non-empty and its last byte is not a newline.
fn needs_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl Sheet for CsvSheet {
    fn header(&self) -> Result<Vec<String>> {
        let records = self.records()?;
        Ok(records
            .first()
            .map(|r| {
                r.iter()
                    .map(|f| f.trim_start_matches('\u{feff}').to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        Ok(self
            .records()?
            .iter()
            .skip(1)
            .map(|r| r.iter().map(Cell::text).collect())
            .collect())
    }

    fn append_row(&mut self, row: &[Cell]) -> Result<()> {
        self.write_record(row.iter().map(Cell::display))
    }

    fn write_header(&mut self, header: &[String]) -> Result<()> {
        if !self.header()?.is_empty() {
            return Err(header_already_written());
        }
        self.write_record(header)
    }
}
