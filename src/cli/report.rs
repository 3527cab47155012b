use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{LedgerError, Result};
use crate::fmt::rupiah;
use crate::ledger;
use crate::models::DailyReport;
use crate::parse::parse_target_date;
use crate::settings::Settings;

pub fn daily(settings: &Settings, date: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    if parse_target_date(&date).is_none() {
        return Err(LedgerError::InvalidDate(format!("{date} (expected YYYY-MM-DD)")));
    }
    let sheet = super::open_ledger(settings)?;
    let report = ledger::daily(&*sheet, &date)?;

    if report.expenses.is_empty() {
        println!("No transactions recorded for {date}.");
        return Ok(());
    }

    println!("Daily summary ({date})\n{}", daily_table(&report));
    println!("Total expenses: {}", rupiah(report.total).as_str().bold());
    Ok(())
}

fn daily_table(report: &DailyReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Description", "Category / Payment", "Type", "Amount"]);
    for (i, entry) in report.expenses.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.description),
            Cell::new(format!("{}/{}", entry.category, entry.payment_method)),
            Cell::new(&entry.kind),
            Cell::new(rupiah(entry.amount)),
        ]);
    }
    table
}

pub fn balance(settings: &Settings) -> Result<()> {
    let sheet = super::open_ledger(settings)?;
    let summary = ledger::all_time(&*sheet)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![
        Cell::new("Total income".green().bold()),
        Cell::new(rupiah(summary.total_income)),
    ]);
    table.add_row(vec![
        Cell::new("Total expense".red().bold()),
        Cell::new(rupiah(summary.total_expense)),
    ]);
    table.add_row(vec![
        Cell::new("Remaining cash".bold()),
        Cell::new(rupiah(summary.expense_minus_income.abs())),
    ]);

    println!("All-time summary\n{table}");
    Ok(())
}
