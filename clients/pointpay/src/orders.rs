//! Merchant order records as reported by the `list` endpoint.

use serde::{Deserialize, Deserializer};

/// Lifecycle state of an order. Owned by the backend; the client only labels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Awaiting payment (`0`).
    Waiting,
    /// Payment received (`1`).
    Paid,
    /// Expired before payment (`-1`).
    TimedOut,
    /// A code this client does not recognise.
    Unknown,
}

impl OrderStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Waiting,
            1 => Self::Paid,
            -1 => Self::TimedOut,
            _ => Self::Unknown,
        }
    }

    /// Human label shown in the order table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "Wait",
            Self::Paid => "Paid",
            Self::TimedOut => "Timeout",
            Self::Unknown => "Unknown",
        }
    }
}

/// One order row, field names as the merchant backend serialises them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Addr")]
    pub addr: String,
    #[serde(rename = "Price", deserialize_with = "points")]
    pub price: i64,
    #[serde(rename = "Asset")]
    pub asset: String,
    #[serde(rename = "Status")]
    pub status: i64,
    /// Unix seconds
    #[serde(rename = "Timeout")]
    pub timeout: i64,
    /// Unix seconds
    #[serde(rename = "LastModify")]
    pub last_modify: i64,
}

impl OrderRecord {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_code(self.status)
    }
}

/// Accept point amounts sent either as integers or as integral floats
/// (the merchant backend stores prices as floating point).
pub fn points<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(serde::de::Error::custom(format!(
            "expected an integer point amount, got {n}"
        ))),
    }
}
