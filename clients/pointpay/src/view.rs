//! Pure view models computed from session state and backend data.
//!
//! Nothing here touches the terminal; [`crate::render`] turns these into text.

use chrono::{DateTime, Local, TimeZone};

use crate::api::{CreatedInvoice, OfferEntry};
use crate::errors::{PayError, Result};
use crate::orders::OrderRecord;
use crate::session::PaySession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordability {
    /// cost + fee, in the funding asset
    pub required: i64,
    /// balance - required; negative when the wallet falls short
    pub remainder: i64,
    pub payable: bool,
}

/// An offer whose total overflows is never payable.
pub fn affordability(offer: &OfferEntry, balance: i64) -> Affordability {
    match offer.total() {
        Some(required) => Affordability {
            required,
            remainder: balance.saturating_sub(required),
            payable: required <= balance,
        },
        None => Affordability {
            required: i64::MAX,
            remainder: balance.saturating_sub(i64::MAX),
            payable: false,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRow {
    pub symbol: String,
    pub display_name: String,
    pub balance: i64,
    /// `None` until an offer covering this asset has been fetched.
    pub quote: Option<Affordability>,
}

impl WalletRow {
    pub fn payable(&self) -> bool {
        self.quote.is_some_and(|q| q.payable)
    }
}

/// One row per wallet asset. Offer entries for assets the wallet does not
/// hold are ignored.
pub fn wallet_rows(session: &PaySession) -> Vec<WalletRow> {
    session
        .wallets
        .values()
        .map(|w| WalletRow {
            symbol: w.symbol.clone(),
            display_name: w.display_name.clone(),
            balance: w.points,
            quote: session
                .offers
                .as_ref()
                .and_then(|o| o.get(&w.symbol))
                .map(|o| affordability(o, w.points)),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSummary {
    pub name: String,
    pub asset: String,
    pub price: u64,
}

pub fn invoice_summary(session: &PaySession) -> Option<InvoiceSummary> {
    session.invoice.as_ref().map(|i| InvoiceSummary {
        name: i.name.clone(),
        asset: i.asset.clone(),
        price: i.price,
    })
}

/// What the user is asked to approve before settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub dest_addr: String,
    pub cost: i64,
    pub funding_asset: String,
    pub price: u64,
    pub target_asset: String,
    pub fee: i64,
    pub total: i64,
}

pub fn confirmation(session: &PaySession) -> Result<Confirmation> {
    let invoice = session
        .invoice
        .as_ref()
        .ok_or_else(|| PayError::Session("no invoice".to_string()))?;
    let asset = session
        .selected
        .as_deref()
        .ok_or_else(|| PayError::Session("no funding asset selected".to_string()))?;
    let offer = session
        .offers
        .as_ref()
        .and_then(|o| o.get(asset))
        .ok_or_else(|| PayError::Session(format!("no offer for {asset}")))?;
    let total = offer
        .total()
        .ok_or_else(|| PayError::Session(format!("offer total for {asset} is out of range")))?;
    Ok(Confirmation {
        dest_addr: invoice.addr.clone(),
        cost: offer.cost,
        funding_asset: asset.to_string(),
        price: invoice.price,
        target_asset: invoice.asset.clone(),
        fee: offer.fee,
        total,
    })
}

// ─────────────────────────────────────────────────────────
// Merchant views
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub item: String,
    pub addr: String,
    pub price: i64,
    pub asset: String,
    pub status: &'static str,
    pub timeout: String,
    pub last_modify: String,
}

/// Newest order first, timestamps as wall-clock time in `tz`.
pub fn order_rows_in<Tz: TimeZone>(records: &[OrderRecord], tz: &Tz) -> Vec<OrderRow>
where
    Tz::Offset: std::fmt::Display,
{
    records
        .iter()
        .rev()
        .map(|r| OrderRow {
            item: r.item.clone(),
            addr: r.addr.clone(),
            price: r.price,
            asset: r.asset.clone(),
            status: r.status().label(),
            timeout: clock_in(r.timeout, tz),
            last_modify: clock_in(r.last_modify, tz),
        })
        .collect()
}

pub fn order_rows(records: &[OrderRecord]) -> Vec<OrderRow> {
    order_rows_in(records, &Local)
}

/// `HH:MM:SS` of a unix timestamp in `tz`; `--:--:--` if out of range.
pub fn clock_in<Tz: TimeZone>(unix_secs: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

pub fn clock(unix_secs: i64) -> String {
    clock_in(unix_secs, &Local)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceCard {
    pub name: String,
    pub addr: String,
    pub asset: String,
    pub price: String,
    pub uri: String,
}

pub fn invoice_card(created: &CreatedInvoice) -> InvoiceCard {
    InvoiceCard {
        name: created.name.clone(),
        addr: created.addr.clone(),
        asset: created.asset.clone(),
        price: created.price.to_string(),
        uri: created.uri.clone(),
    }
}
