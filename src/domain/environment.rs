use chrono::{DateTime, Utc};
use serde_json::Value;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh, unique item identifiers.
pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> String;
}

/// Turns a JSON value into response body bytes.
pub trait Encoder: Send + Sync + 'static {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("encoding failed: {0}")]
    Other(String),
}
