//! HTTP+JSON client for the payer wallet backend and the merchant backend.
//!
//! Every call is a plain `GET` with query parameters. Non-2xx responses are
//! turned into [`PayError::Status`] carrying the raw response body, which is
//! what the user gets to see.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::errors::{PayError, Result};
use crate::orders::{points, OrderRecord};

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

/// `GET walletinfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WalletInfo {
    #[serde(default)]
    pub balance: BTreeMap<String, i64>,
}

/// One funding-asset quote inside an `offer` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfferEntry {
    pub cost: i64,
    pub fee: i64,
    /// Opaque single-use token handed back to `send`.
    pub id: String,
}

impl OfferEntry {
    /// cost + fee; `None` if the sum does not fit in an `i64`.
    pub fn total(&self) -> Option<i64> {
        self.cost.checked_add(self.fee)
    }
}

/// `GET offer`: funding asset symbol → quote.
pub type OfferSet = BTreeMap<String, OfferEntry>;

/// `GET send`
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    pub result: bool,
    #[serde(default)]
    pub message: String,
}

/// `GET order`
#[derive(Debug, Clone, Deserialize)]
struct OrderResponse {
    result: bool,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    addr: String,
    #[serde(default)]
    asset: String,
    #[serde(default, deserialize_with = "optional_points")]
    price: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

/// A freshly allocated invoice as returned by the merchant backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub uri: String,
    pub name: String,
    pub addr: String,
    pub asset: String,
    pub price: i64,
}

/// `GET list`
#[derive(Debug, Clone, Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Option<Vec<OrderRecord>>,
}

fn optional_points<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    points(deserializer).map(Some)
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

/// Backend client bound to the payer and merchant base URLs.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    payer_url: Url,
    merchant_url: Url,
}

impl BackendClient {
    pub fn new(client: Client, payer_url: Url, merchant_url: Url) -> Self {
        Self {
            client,
            payer_url,
            merchant_url,
        }
    }

    /// Current per-asset point balances of the payer wallet.
    pub async fn wallet_info(&self) -> Result<WalletInfo> {
        self.get(&self.payer_url, "walletinfo", &[]).await
    }

    /// Quote every fundable asset against `cost` points of `asset`.
    /// Quotes whose cost + fee overflow are rejected as a whole.
    pub async fn offer(&self, asset: &str, cost: u64) -> Result<OfferSet> {
        let cost = cost.to_string();
        let offers: OfferSet = self
            .get(
                &self.payer_url,
                "offer",
                &[("asset", asset), ("cost", cost.as_str())],
            )
            .await?;
        if let Some((symbol, _)) = offers.iter().find(|(_, o)| o.total().is_none()) {
            return Err(PayError::Rejected(format!(
                "offer for {symbol} has an out-of-range total"
            )));
        }
        Ok(offers)
    }

    /// Settle offer `id`, paying to `addr`.
    pub async fn send(&self, id: &str, addr: &str) -> Result<SendResponse> {
        let res: SendResponse = self
            .get(&self.payer_url, "send", &[("id", id), ("addr", addr)])
            .await?;
        if !res.result {
            return Err(PayError::Rejected(if res.message.is_empty() {
                "send returned result=false".to_string()
            } else {
                res.message
            }));
        }
        Ok(res)
    }

    /// Ask the merchant backend for a new invoice for `item`.
    pub async fn order(&self, item: &str) -> Result<CreatedInvoice> {
        let res: OrderResponse = self
            .get(&self.merchant_url, "order", &[("item", item)])
            .await?;
        if !res.result {
            return Err(PayError::Rejected(
                res.error
                    .unwrap_or_else(|| format!("order returned result=false for {item}")),
            ));
        }
        Ok(CreatedInvoice {
            uri: res.uri,
            name: res.name,
            addr: res.addr,
            asset: res.asset,
            price: res.price.unwrap_or(0),
        })
    }

    /// All orders known to the merchant backend, oldest first.
    pub async fn list(&self) -> Result<Vec<OrderRecord>> {
        let res: ListResponse = self.get(&self.merchant_url, "list", &[]).await?;
        Ok(res.result.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        base: &Url,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = base.join(endpoint)?;
        debug!("GET {url} {query:?}");

        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PayError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
