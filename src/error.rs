use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Language-model service misconfigured or replied with something unusable.
    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Required header column(s) absent; the message names them.
    #[error("{0}")]
    MissingColumn(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
