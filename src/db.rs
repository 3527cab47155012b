use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::Cell;
use crate::sheet::{header_already_written, Sheet};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sheet_header (
    position INTEGER PRIMARY KEY,
    label TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sheet_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cells TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Sheet kept in SQLite. Rows are stored as JSON arrays of typed cells so
/// native dates and numbers survive a round trip.
pub struct SqliteSheet {
    conn: Connection,
}

impl SqliteSheet {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = get_connection(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

impl Sheet for SqliteSheet {
    fn header(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label FROM sheet_header ORDER BY position")?;
        let labels = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(labels)
    }

    fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        let mut stmt = self.conn.prepare("SELECT cells FROM sheet_rows ORDER BY id")?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut rows = Vec::with_capacity(raw.len());
        for cells in raw {
            rows.push(serde_json::from_str(&cells)?);
        }
        Ok(rows)
    }

    fn append_row(&mut self, row: &[Cell]) -> Result<()> {
        let cells = serde_json::to_string(row)?;
        self.conn
            .execute("INSERT INTO sheet_rows (cells) VALUES (?1)", [cells])?;
        Ok(())
    }

    fn write_header(&mut self, header: &[String]) -> Result<()> {
        if !self.header()?.is_empty() {
            return Err(header_already_written());
        }
        let tx = self.conn.transaction()?;
        for (position, label) in header.iter().enumerate() {
            tx.execute(
                "INSERT INTO sheet_header (position, label) VALUES (?1, ?2)",
                rusqlite::params![position as i64, label],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
