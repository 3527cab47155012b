use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::models::{DailyReport, Entry, NewTransaction, Summary, TransactionKind};
use crate::parse::parse_target_date;
use crate::schema::{cell, Columns};
use crate::sheet::Sheet;

pub const ACTION_DAILY: &str = "get_daily";
pub const ACTION_ALL_TIME: &str = "calculate_expense_minus_income";

/// A read request, decoded from the `action` and `date` query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Daily { date: String },
    AllTime,
}

impl Action {
    /// `None` for an unknown action, or a daily request without a date.
    pub fn from_params(action: Option<&str>, date: Option<&str>) -> Option<Self> {
        match (action, date) {
            (Some(ACTION_DAILY), Some(d)) if !d.is_empty() => Some(Self::Daily {
                date: d.to_string(),
            }),
            (Some(ACTION_ALL_TIME), _) => Some(Self::AllTime),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

/// Append one transaction stamped with `now`; returns the stored amount.
pub fn append(sheet: &mut dyn Sheet, tx: NewTransaction, now: NaiveDateTime) -> Result<f64> {
    let amount = tx.amount();
    sheet.append_row(&tx.into_row(now))?;
    info!(amount, timestamp = %now, "appended transaction");
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Daily report
// ---------------------------------------------------------------------------

/// Rows recorded on `date` (`YYYY-MM-DD`) in sheet order. Every matching
/// row is listed; only expense rows count toward the total. A `date` that is
/// not a valid `YYYY-MM-DD` matches no row.
pub fn daily(sheet: &dyn Sheet, date: &str) -> Result<DailyReport> {
    let cols = Columns::resolve(&sheet.header()?).for_daily()?;
    let Some(target) = parse_target_date(date) else {
        debug!(date, "target date does not parse; no rows can match");
        return Ok(DailyReport {
            date: date.to_string(),
            expenses: Vec::new(),
            total: 0.0,
        });
    };

    let mut expenses = Vec::new();
    let mut total = 0.0;
    for (i, row) in sheet.rows()?.iter().enumerate() {
        let row_no = i + 2;
        let date_cell = cell(row, Some(cols.date));
        let Some(recorded) = date_cell.to_datetime() else {
            debug!(row = row_no, value = %date_cell.display(), "skipping row without a usable date");
            continue;
        };
        if recorded.date() != target {
            continue;
        }

        let amount = cell(row, Some(cols.amount)).to_amount();
        let kind = cell(row, cols.kind);
        if TransactionKind::classify(&kind.display()) == TransactionKind::Expense {
            total += amount;
        }
        expenses.push(Entry {
            description: cell(row, cols.description).display_or("N/A"),
            amount,
            category: cell(row, cols.category).display_or(""),
            payment_method: cell(row, cols.payment_method).display_or(""),
            kind: kind.display_or("N/A"),
        });
    }

    Ok(DailyReport {
        date: date.to_string(),
        expenses,
        total,
    })
}

// ---------------------------------------------------------------------------
// All-time summary
// ---------------------------------------------------------------------------

pub fn all_time(sheet: &dyn Sheet) -> Result<Summary> {
    let cols = Columns::resolve(&sheet.header()?).for_summary()?;

    let mut total_expense = 0.0;
    let mut total_income = 0.0;
    for row in sheet.rows()? {
        let amount = cell(&row, Some(cols.amount)).to_amount();
        match TransactionKind::classify(&cell(&row, Some(cols.kind)).display()) {
            TransactionKind::Expense => total_expense += amount,
            TransactionKind::Income => total_income += amount,
            TransactionKind::Unknown => {}
        }
    }

    Ok(Summary {
        calculation_period: "all_time",
        total_expense,
        total_income,
        expense_minus_income: total_expense - total_income,
    })
}
