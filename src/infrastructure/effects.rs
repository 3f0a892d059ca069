use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::environment::{Clock, EncodeError, Encoder, IdGenerator};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Upper-case hyphenated UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String { Uuid::new_v4().hyphenated().to_string().to_uppercase() }
}

#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl IdGenerator for FixedIdGenerator {
    fn next_id(&self) -> String { self.0.clone() }
}

/// Yields `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self { Self { prefix: prefix.into(), next: AtomicU64::new(1) } }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    pub pretty: bool,
}

impl Encoder for JsonEncoder {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let bytes = if self.pretty { serde_json::to_vec_pretty(value)? } else { serde_json::to_vec(value)? };
        Ok(bytes)
    }
}
