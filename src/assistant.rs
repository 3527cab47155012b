//! Turns a free-text message ("25K nasi goreng via ShopeePay") into a
//! transaction by asking a local Ollama model for a JSON object.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::models::{NewTransaction, TransactionKind};
use crate::settings::Settings;

pub const PAYMENT_METHODS: [&str; 5] = ["BCA", "Jago", "ShopeePay", "Gopay", "Cash"];
pub const CATEGORIES: [&str; 10] = [
    "Makanan",
    "Bahan Makanan",
    "Transportasi",
    "Belanja Harian",
    "Belanja Online",
    "Tagihan",
    "Hiburan",
    "Buah",
    "Kesehatan",
    "Pemasukan",
];
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";
pub const INCOME_CATEGORY: &str = "Pemasukan";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Instructions plus two worked examples, ending with the user's message.
pub fn build_prompt(user_input: &str) -> String {
    let payment_methods = PAYMENT_METHODS.join(", ");
    let categories = CATEGORIES.join(", ");
    format!(
        r#"You parse personal finance transactions. From the user's description of one transaction (an expense or an income), extract the details and reply with JSON only, using these fields:

- transaction_type: "income" for money coming in, including cash withdrawn from an ATM; "expense" for spending. If not stated, use "expense".
- amount: the amount in Rupiah as a whole number, without a currency sign
- description: a short description of the transaction
- payment_method: one of [{payment_methods}]; if not stated, use {DEFAULT_PAYMENT_METHOD}
- category: one of [{categories}]; if transaction_type is "income", use "{INCOME_CATEGORY}"

Examples:

Input: "Ambil uang dari atm 500000"

Reply with JSON only:
{{
  "transaction_type": "income",
  "amount": 500000,
  "description": "Ambil uang dari atm",
  "payment_method": "Cash",
  "category": "Pemasukan"
}}

Input: "25K nasi goreng via ShopeePay"

Reply with JSON only:
{{
  "transaction_type": "expense",
  "amount": 25000,
  "description": "nasi goreng",
  "payment_method": "ShopeePay",
  "category": "Makanan"
}}

Now analyse the following input and reply with JSON only:
"{user_input}"
"#
    )
}

/// Fill the fields a model reply tends to leave out.
pub fn apply_defaults(tx: &mut NewTransaction) {
    fn blank(v: &Option<String>) -> bool {
        v.as_deref().map_or(true, str::is_empty)
    }
    if blank(&tx.transaction_type) {
        tx.transaction_type = Some("expense".to_string());
    }
    if blank(&tx.payment_method) {
        tx.payment_method = Some(DEFAULT_PAYMENT_METHOD.to_string());
    }
    let is_income = tx
        .transaction_type
        .as_deref()
        .is_some_and(|t| TransactionKind::classify(t) == TransactionKind::Income);
    if is_income && blank(&tx.category) {
        tx.category = Some(INCOME_CATEGORY.to_string());
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let missing: Vec<&str> = [
            ("KAS_OLLAMA_URL", &settings.ollama_url),
            ("KAS_OLLAMA_MODEL", &settings.ollama_model),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect();
        match (&settings.ollama_url, &settings.ollama_model) {
            (Some(url), Some(model)) if missing.is_empty() => Self::new(url, model),
            _ => Err(LedgerError::Assistant(format!(
                "not configured; set {} (or ollama_url/ollama_model in settings.json)",
                missing.join(", ")
            ))),
        }
    }

    /// Send `prompt` and return the model's raw text reply.
    pub async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        debug!(url = %self.url, model = %self.model, "sending prompt");
        let reply: GenerateResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        reply
            .response
            .filter(|r| !r.is_empty())
            .ok_or_else(|| LedgerError::Assistant("model reply has no 'response' text".to_string()))
    }

    /// Ask the model to describe `message` as a transaction JSON object.
    pub async fn extract_transaction(&self, message: &str) -> Result<String> {
        let reply = self.generate(build_prompt(message)).await?;
        info!(message, reply = %reply, "model replied");
        Ok(reply)
    }
}
