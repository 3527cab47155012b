//! Column contract of the backing sheet.
//!
//! Columns are found by exact header label, so the physical order may differ
//! from the order rows are appended in.

use crate::error::{LedgerError, Result};
use crate::models::Cell;

pub const DATE: &str = "Tanggal";
pub const AMOUNT: &str = "Amount";
pub const DESCRIPTION: &str = "Description";
pub const CATEGORY: &str = "Category";
pub const PAYMENT_METHOD: &str = "Payment Method";
pub const TYPE: &str = "Type";

/// Header written into a fresh sheet; matches the append order.
pub const DEFAULT_HEADER: [&str; 6] = [DATE, AMOUNT, DESCRIPTION, PAYMENT_METHOD, CATEGORY, TYPE];

/// Resolved column positions for one header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub description: Option<usize>,
    pub category: Option<usize>,
    pub payment_method: Option<usize>,
    pub kind: Option<usize>,
}

/// Column positions guaranteed for the daily query.
#[derive(Debug, Clone, Copy)]
pub struct DailyColumns {
    pub date: usize,
    pub amount: usize,
    pub description: Option<usize>,
    pub category: Option<usize>,
    pub payment_method: Option<usize>,
    pub kind: Option<usize>,
}

/// Column positions guaranteed for the all-time summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryColumns {
    pub amount: usize,
    pub kind: usize,
}

impl Columns {
    pub fn resolve(header: &[String]) -> Self {
        let find = |name: &str| header.iter().position(|h| h == name);
        Self {
            date: find(DATE),
            amount: find(AMOUNT),
            description: find(DESCRIPTION),
            category: find(CATEGORY),
            payment_method: find(PAYMENT_METHOD),
            kind: find(TYPE),
        }
    }

    pub fn for_daily(&self) -> Result<DailyColumns> {
        match (self.date, self.amount) {
            (Some(date), Some(amount)) => Ok(DailyColumns {
                date,
                amount,
                description: self.description,
                category: self.category,
                payment_method: self.payment_method,
                kind: self.kind,
            }),
            _ => Err(LedgerError::MissingColumn(format!(
                "column '{DATE}' or '{AMOUNT}' not found in header"
            ))),
        }
    }

    pub fn for_summary(&self) -> Result<SummaryColumns> {
        match (self.amount, self.kind) {
            (Some(amount), Some(kind)) => Ok(SummaryColumns { amount, kind }),
            _ => Err(LedgerError::MissingColumn(format!(
                "column '{AMOUNT}' or '{TYPE}' not found in header"
            ))),
        }
    }

    /// Startup check: every column either query path requires.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [(DATE, self.date), (AMOUNT, self.amount), (TYPE, self.kind)]
            .into_iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::MissingColumn(format!(
                "header is missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Cell at `idx`, or empty when the column is absent or the row is short.
pub fn cell(row: &[Cell], idx: Option<usize>) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY)
}
