use serde_json::Value;

use crate::error::Result;
use crate::fmt::rupiah;
use crate::ledger;
use crate::models::NewTransaction;
use crate::settings::Settings;

pub fn run(
    settings: &Settings,
    amount: &str,
    description: &str,
    payment_method: &str,
    category: &str,
    kind: &str,
) -> Result<()> {
    let tx = NewTransaction {
        amount: Some(Value::String(amount.to_string())),
        description: Some(description.to_string()),
        payment_method: Some(payment_method.to_string()),
        category: Some(category.to_string()),
        transaction_type: Some(kind.to_string()),
    };
    record(settings, tx)
}

/// Append `tx` stamped with the local time and print a one-line receipt.
pub(crate) fn record(settings: &Settings, tx: NewTransaction) -> Result<()> {
    let label = format!(
        "{} - {}",
        non_empty(tx.category.as_deref()),
        non_empty(tx.description.as_deref())
    );
    let mut sheet = super::open_ledger(settings)?;
    let now = chrono::Local::now().naive_local();
    let amount = ledger::append(&mut *sheet, tx, now)?;
    println!("Recorded {label} ({})", rupiah(amount));
    Ok(())
}

fn non_empty(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}
