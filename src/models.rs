use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::parse::{coerce_amount, parse_date, parse_float_prefix};

/// One cell of the backing sheet, normalized at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

pub const DATE_CELL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    /// Empty cells, empty strings and zero read as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(n) => *n == 0.0 || n.is_nan(),
            Cell::Date(_) => false,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format(DATE_CELL_FORMAT).to_string(),
        }
    }

    /// `display()`, or `fallback` when the cell is blank.
    pub fn display_or(&self, fallback: &str) -> String {
        if self.is_blank() {
            fallback.to_string()
        } else {
            self.display()
        }
    }

    /// Native dates pass through; text is parsed; anything else has no date.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            Cell::Empty | Cell::Number(_) => None,
        }
    }

    /// Numeric value of the cell, 0 when it does not start with a number.
    pub fn to_amount(&self) -> f64 {
        match self {
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Text(s) => parse_float_prefix(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Income,
    Unknown,
}

impl TransactionKind {
    /// Case-insensitive exact match; padded labels such as `" expense "`
    /// are `Unknown`.
    pub fn classify(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "expense" => Self::Expense,
            "income" => Self::Income,
            _ => Self::Unknown,
        }
    }
}

/// Body of an append request. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
}

impl NewTransaction {
    pub fn amount(&self) -> f64 {
        coerce_amount(self.amount.as_ref())
    }

    /// Sheet row in append order: timestamp, amount, description,
    /// payment method, category, type.
    pub fn into_row(self, timestamp: NaiveDateTime) -> Vec<Cell> {
        let amount = self.amount();
        let text = |v: Option<String>| v.map(Cell::text).unwrap_or(Cell::Empty);
        vec![
            Cell::Date(timestamp),
            Cell::Number(amount),
            text(self.description),
            text(self.payment_method),
            text(self.category),
            text(self.transaction_type),
        ]
    }
}

/// Whole numbers go out as JSON integers (`50`, not `50.0`).
pub fn serialize_amount<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        s.serialize_i64(*value as i64)
    } else {
        s.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub description: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    pub category: String,
    pub payment_method: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub expenses: Vec<Entry>,
    #[serde(serialize_with = "serialize_amount")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub calculation_period: &'static str,
    #[serde(serialize_with = "serialize_amount")]
    pub total_expense: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub total_income: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub expense_minus_income: f64,
}
