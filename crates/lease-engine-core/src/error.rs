use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseEngineError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Unbalanced journal entry '{description}': debits {debits} != credits {credits}")]
    UnbalancedEntry {
        description: String,
        debits: Decimal,
        credits: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LeaseEngineError {
    fn from(e: serde_json::Error) -> Self {
        LeaseEngineError::SerializationError(e.to_string())
    }
}
