use std::io::Read;

use serde_json::{Map, Value};
use tracing::info;

use crate::assistant::{apply_defaults, OllamaClient};
use crate::error::{LedgerError, Result};
use crate::models::NewTransaction;
use crate::parse::extract_json_object;
use crate::settings::Settings;

/// Record a transaction described in `text` (stdin when omitted).
///
/// The text goes to the configured Ollama model first, unless `reply` says it
/// already is a model reply.
pub fn run(settings: &Settings, text: Option<String>, reply: bool) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let reply_text = if reply {
        text
    } else {
        let client = OllamaClient::from_settings(settings)?;
        let runtime = tokio::runtime::Runtime::new()?;
        info!("asking the model to read the message");
        runtime.block_on(client.extract_transaction(text.trim()))?
    };
    let mut tx = transaction_from_text(&reply_text)?;
    apply_defaults(&mut tx);
    super::add::record(settings, tx)
}

/// Find the transaction object in a free-form message, such as a chat
/// assistant's reply, and decode it.
pub fn transaction_from_text(text: &str) -> Result<NewTransaction> {
    let object = extract_json_object(text).ok_or_else(|| {
        LedgerError::Other("could not find transaction details in the message".to_string())
    })?;
    check_amount(&object)?;
    Ok(serde_json::from_value(Value::Object(object))?)
}

fn check_amount(object: &Map<String, Value>) -> Result<()> {
    match object.get("amount") {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v > 0.0) => Ok(()),
        other => Err(LedgerError::Other(format!(
            "amount missing or invalid ({}); nothing saved",
            other.map(Value::to_string).unwrap_or_else(|| "none".to_string())
        ))),
    }
}
