//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("QR code error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("{endpoint} failed with HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Request rejected by backend: {0}")]
    Rejected(String),

    #[error("Incorrect payment info format: {0}")]
    MalformedInvoice(String),

    #[error("No payinfo: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PayError>;
