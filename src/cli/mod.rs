pub mod add;
pub mod init;
pub mod record;
pub mod report;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::settings::{Backend, Settings};
use crate::sheet::{ensure_header, open_sheet, SharedSheet};

/// Open the configured sheet, creating the data dir and header as needed.
pub(crate) fn open_ledger(settings: &Settings) -> Result<SharedSheet> {
    let data_dir = settings.data_path();
    std::fs::create_dir_all(&data_dir)?;
    let mut sheet = open_sheet(&data_dir, settings.backend)?;
    ensure_header(&mut *sheet)?;
    Ok(sheet)
}

#[derive(Parser)]
#[command(name = "kas", about = "Personal cash ledger with a tiny HTTP API.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and backend, and create the sheet.
    Init {
        /// Path for kas data (default: ~/Documents/kas)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Storage backend for the sheet
        #[arg(long, value_enum)]
        backend: Option<Backend>,
    },
    /// Serve the JSON API until interrupted.
    Serve {
        /// Listen address, e.g. 127.0.0.1:8080
        #[arg(long)]
        addr: Option<String>,
    },
    /// Record one transaction.
    Add {
        /// Amount; a leading number is enough ("25000", "12.5k")
        amount: String,
        /// What the money was for
        description: String,
        #[arg(long = "payment-method", default_value = "Cash")]
        payment_method: String,
        #[arg(long, default_value = "")]
        category: String,
        /// expense or income
        #[arg(long = "type", default_value = "expense")]
        kind: String,
    },
    /// Record a transaction described in plain words, read by the Ollama model.
    Record {
        /// Message text; read from stdin when omitted
        text: Option<String>,
        /// The text already is a model reply holding a JSON object; skip the model
        #[arg(long)]
        reply: bool,
    },
    /// Show one day's transactions.
    Daily {
        /// Day to show: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show all-time income, expense and remaining cash.
    Balance,
}
