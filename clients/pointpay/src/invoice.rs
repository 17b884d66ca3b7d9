//! Invoice URI parsing and generation.
//!
//! ## URI Format
//!
//! ```text
//! px:invoice?addr=2dcyt9LFshsNYNzPzXAtpzTkCo4kKJKjgG2&asset=MELON&name=Caramel+Macchiato+Coffee&price=200
//! ```
//!
//! Key order is not significant and unknown keys are carried along unused.
//! Values are percent-encoded; a literal `+` stands for a space.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::errors::{PayError, Result};

/// Scheme identifier every invoice URI starts with, before the `?`.
pub const INVOICE_SCHEME: &str = "px:invoice";

/// A merchant-issued request for `price` points of `asset`, payable to `addr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub name: String,
    pub addr: String,
    pub price: u64,
    pub asset: String,
    /// Keys other than the four required ones.
    pub extra: BTreeMap<String, String>,
}

impl Invoice {
    /// Encode the invoice the way the merchant backend does: sorted keys,
    /// `application/x-www-form-urlencoded` values.
    pub fn to_uri(&self) -> String {
        let mut fields: BTreeMap<&str, String> = self
            .extra
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        fields.insert("addr", self.addr.clone());
        fields.insert("asset", self.asset.clone());
        fields.insert("name", self.name.clone());
        fields.insert("price", self.price.to_string());

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{INVOICE_SCHEME}?{query}")
    }
}

/// Parse an invoice URI.
///
/// Fails with [`PayError::MalformedInvoice`] when the scheme is wrong, when any
/// of `addr`, `asset`, `name`, `price` is missing or empty, or when `price` is
/// not a non-negative integer.
pub fn parse_invoice_uri(uri: &str) -> Result<Invoice> {
    let malformed = || PayError::MalformedInvoice(uri.to_string());

    let query = uri
        .strip_prefix(INVOICE_SCHEME)
        .and_then(|rest| rest.strip_prefix('?'))
        .ok_or_else(malformed)?;

    let mut fields = BTreeMap::new();
    for pair in query.split('&') {
        let Some((key, raw)) = pair.split_once('=') else {
            continue;
        };
        let value = decode_value(raw).ok_or_else(malformed)?;
        fields.insert(key.to_string(), value);
    }

    let mut take = |key: &str| {
        fields
            .remove(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(malformed)
    };
    let name = take("name")?;
    let addr = take("addr")?;
    let asset = take("asset")?;
    let price = take("price")?.parse::<u64>().map_err(|_| malformed())?;

    Ok(Invoice {
        name,
        addr,
        price,
        asset,
        extra: fields,
    })
}

fn decode_value(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', "%20");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|v| v.into_owned())
}
