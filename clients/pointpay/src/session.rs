//! Payer session state.
//!
//! A [`PaySession`] is owned by the payer controller and mutated only there.
//! Resetting means replacing it with [`PaySession::default`].

use std::collections::BTreeMap;

use crate::api::{OfferEntry, OfferSet, WalletInfo};
use crate::errors::{PayError, Result};
use crate::invoice::Invoice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEntry {
    pub symbol: String,
    pub display_name: String,
    pub points: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaySession {
    pub wallets: BTreeMap<String, WalletEntry>,
    pub invoice: Option<Invoice>,
    pub offers: Option<OfferSet>,
    pub selected: Option<String>,
}

impl PaySession {
    /// Fold a `walletinfo` response into the session. Known assets are
    /// updated in place, new ones are added, missing ones are kept.
    pub fn merge_balances(&mut self, info: &WalletInfo) {
        for (symbol, points) in &info.balance {
            self.wallets
                .entry(symbol.clone())
                .and_modify(|w| w.points = *points)
                .or_insert_with(|| WalletEntry {
                    symbol: symbol.clone(),
                    display_name: format!("{symbol}pt"),
                    points: *points,
                });
        }
    }

    /// Start paying `invoice`. Any offer or selection from before is dropped.
    pub fn set_invoice(&mut self, invoice: Invoice) {
        self.invoice = Some(invoice);
        self.offers = None;
        self.selected = None;
    }

    pub fn set_offers(&mut self, offers: OfferSet) {
        self.offers = Some(offers);
        self.selected = None;
    }

    /// Choose the funding asset. Only assets whose offer is covered by the
    /// wallet balance can be selected.
    pub fn select(&mut self, symbol: &str) -> Result<&OfferEntry> {
        let offers = self
            .offers
            .as_ref()
            .ok_or_else(|| PayError::Session("no offer fetched".to_string()))?;
        let entry = offers
            .get(symbol)
            .ok_or_else(|| PayError::Session(format!("no offer for {symbol}")))?;
        let balance = self
            .wallets
            .get(symbol)
            .map(|w| w.points)
            .ok_or_else(|| PayError::Session(format!("no wallet balance for {symbol}")))?;
        if entry.total().map_or(true, |total| total > balance) {
            return Err(PayError::Session(format!("{symbol} balance is insufficient")));
        }
        self.selected = Some(symbol.to_string());
        Ok(entry)
    }

    /// Offer id and destination address for settlement.
    pub fn settlement_target(&self) -> Result<(&str, &str)> {
        let id = self
            .selected
            .as_deref()
            .and_then(|s| self.offers.as_ref()?.get(s))
            .map(|o| o.id.as_str())
            .filter(|id| !id.is_empty());
        let addr = self
            .invoice
            .as_ref()
            .map(|i| i.addr.as_str())
            .filter(|a| !a.is_empty());
        match (id, addr) {
            (Some(id), Some(addr)) => Ok((id, addr)),
            (id, addr) => Err(PayError::Session(format!(
                "{},{}",
                id.unwrap_or("undefined"),
                addr.unwrap_or("undefined")
            ))),
        }
    }
}
