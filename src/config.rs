use std::net::{IpAddr, SocketAddr};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a valid {expected}: `{value}`")]
    Invalid { key: &'static str, expected: &'static str, value: String },
}

/// Server settings, read from the process environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub pretty_json: bool,
    /// Largest request body accepted, in bytes.
    pub body_limit: usize,
}

pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Self { host: IpAddr::from([127, 0, 0, 1]), port: 5566, base_url: "http://127.0.0.1".to_string(), pretty_json: false, body_limit: DEFAULT_BODY_LIMIT }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = match lookup("TODO_HOST") {
            Some(v) => v.parse::<IpAddr>().map_err(|_| invalid("TODO_HOST", "IP address", v))?,
            None => defaults.host,
        };
        let port = match lookup("TODO_PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| invalid("TODO_PORT", "port", v))?,
            None => defaults.port,
        };
        let pretty_json = match lookup("TODO_PRETTY_JSON") {
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid("TODO_PRETTY_JSON", "boolean", v)),
            },
            None => defaults.pretty_json,
        };
        let body_limit = match lookup("TODO_BODY_LIMIT") {
            Some(v) => v.parse::<usize>().map_err(|_| invalid("TODO_BODY_LIMIT", "byte count", v))?,
            None => defaults.body_limit,
        };
        let base_url = lookup("TODO_BASE_URL").unwrap_or(defaults.base_url);
        Ok(Self { host, port, base_url: base_url.trim_end_matches('/').to_string(), pretty_json, body_limit })
    }

    pub fn addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }

    /// Where clients are pointed when a request cannot be routed.
    pub fn location(&self) -> String { format!("{}:{}", self.base_url, self.port) }
}

fn invalid(key: &'static str, expected: &'static str, value: String) -> ConfigError { ConfigError::Invalid { key, expected, value } }
