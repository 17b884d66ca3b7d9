//! Application configuration loaded from environment variables.

use url::Url;

use crate::errors::{PayError, Result};

pub const DEFAULT_ORDER_ITEM: &str = "Caramel Macchiato Coffee";

#[derive(Debug, Clone)]
pub struct Config {
    /// Payer wallet backend serving `walletinfo`, `offer` and `send`
    pub payer_url: Url,
    /// Merchant backend serving `order` and `list`
    pub merchant_url: Url,
    /// Delay (in seconds) between the end of one order-list fetch and the next
    pub poll_interval_secs: u64,
    /// Catalog item requested when creating an invoice
    pub order_item: String,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            payer_url: parse_base_url(
                "PAYER_URL",
                &env_var("PAYER_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/".to_string()),
            )?,
            merchant_url: parse_base_url(
                "MERCHANT_URL",
                &env_var("MERCHANT_URL").unwrap_or_else(|_| "http://127.0.0.1:8030/".to_string()),
            )?,
            poll_interval_secs: env_var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| PayError::Config("Invalid POLL_INTERVAL_SECS".to_string()))?,
            order_item: env_var("ORDER_ITEM").unwrap_or_else(|_| DEFAULT_ORDER_ITEM.to_string()),
            http_timeout_secs: env_var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| PayError::Config("Invalid HTTP_TIMEOUT_SECS".to_string()))?,
        })
    }
}

/// Parse a backend root URL. A trailing `/` is appended when missing so that
/// endpoint names join under the path instead of replacing its last segment.
pub fn parse_base_url(key: &str, raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| PayError::Config(format!("Invalid {key}: {e}")))
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| PayError::Config(format!("Missing env var: {key}")))
}
