//! Interactive payer flow: invoice URI → offer → confirmation → settlement.
//!
//! Each round starts from a fresh [`PaySession`]. Any failure after the
//! wallet has loaded (malformed URI, offer or settlement error) alerts the user
//! and throws the whole session away, since balances and offer ids may be
//! stale by then.

use tracing::{error, info, warn};

use crate::api::BackendClient;
use crate::console::Console;
use crate::errors::Result;
use crate::invoice::parse_invoice_uri;
use crate::render;
use crate::session::PaySession;
use crate::view;

/// How one round of the payer flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Paid,
    Cancelled,
    Failed,
    /// Wallet fetch failed, user asked to try again.
    Retry,
    /// Input closed.
    Quit,
}

pub struct Payer<'a, C: Console> {
    client: &'a BackendClient,
    console: &'a mut C,
    session: PaySession,
}

impl<'a, C: Console> Payer<'a, C> {
    pub fn new(client: &'a BackendClient, console: &'a mut C) -> Self {
        Self {
            client,
            console,
            session: PaySession::default(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &PaySession {
        &self.session
    }

    fn reset(&mut self) {
        self.session = PaySession::default();
    }

    /// Run rounds until the input closes. Returns the wallet error if the
    /// user declines to retry after a failed balance fetch.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.pay_once().await? {
                Outcome::Quit => return Ok(()),
                outcome => info!("Payment round ended: {outcome:?}"),
            }
        }
    }

    /// One full round. The session is reset before returning unless the
    /// input closed mid-round.
    pub async fn pay_once(&mut self) -> Result<Outcome> {
        self.reset();
        let outcome = self.round().await?;
        if outcome != Outcome::Quit {
            self.reset();
        }
        Ok(outcome)
    }

    async fn round(&mut self) -> Result<Outcome> {
        match self.client.wallet_info().await {
            Ok(info) => self.session.merge_balances(&info),
            Err(e) => {
                error!("walletinfo failed: {e}");
                self.console.alert(&format!("walletinfo fail\n{e}")).await?;
                if self
                    .console
                    .confirm("Cannot retrieve wallet info. Do you want to retry?")
                    .await?
                {
                    return Ok(Outcome::Retry);
                }
                return Err(e);
            }
        }
        info!("Wallet loaded: {} assets", self.session.wallets.len());
        self.show_wallet().await?;

        let uri = loop {
            match self.console.ask("Invoice URI: ").await? {
                None => return Ok(Outcome::Quit),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line.trim().to_string(),
            }
        };

        let invoice = match parse_invoice_uri(&uri) {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!("Rejected invoice URI: {uri}");
                self.console.alert(&e.to_string()).await?;
                return Ok(Outcome::Failed);
            }
        };
        let (asset, price) = (invoice.asset.clone(), invoice.price);
        self.session.set_invoice(invoice);
        if let Some(summary) = view::invoice_summary(&self.session) {
            self.console.show(&render::invoice_summary(&summary)).await?;
        }

        match self.client.offer(&asset, price).await {
            Ok(offers) => {
                info!("Offer received for {} funding assets", offers.len());
                self.session.set_offers(offers);
            }
            Err(e) => {
                error!("offer failed: {e}");
                self.console.alert(&format!("offer fail\n{e}")).await?;
                return Ok(Outcome::Failed);
            }
        }
        self.show_wallet().await?;

        if !view::wallet_rows(&self.session).iter().any(|r| r.payable()) {
            self.console
                .alert("No wallet asset covers this invoice.")
                .await?;
            return Ok(Outcome::Cancelled);
        }

        loop {
            let Some(answer) = self
                .console
                .ask("Pay with asset (blank to cancel): ")
                .await?
            else {
                return Ok(Outcome::Quit);
            };
            let symbol = answer.trim();
            if symbol.is_empty() {
                return Ok(Outcome::Cancelled);
            }
            match self.session.select(symbol) {
                Ok(_) => break,
                Err(e) => self.console.alert(&e.to_string()).await?,
            }
        }

        let confirmation = view::confirmation(&self.session)?;
        self.console
            .show(&render::confirmation(&confirmation))
            .await?;
        if !self.console.confirm("Confirm payment?").await? {
            info!("Payment cancelled by user");
            return Ok(Outcome::Cancelled);
        }

        self.settle().await
    }

    async fn settle(&mut self) -> Result<Outcome> {
        let (id, addr) = match self.session.settlement_target() {
            Ok((id, addr)) => (id.to_string(), addr.to_string()),
            Err(e) => {
                self.console.alert(&e.to_string()).await?;
                return Ok(Outcome::Failed);
            }
        };

        match self.client.send(&id, &addr).await {
            Ok(_) => {
                info!("Settled offer {id} to {addr}");
                self.console.show("Thank you for your payment!").await?;
                match self.console.ask("Press enter to continue ").await? {
                    Some(_) => Ok(Outcome::Paid),
                    None => Ok(Outcome::Quit),
                }
            }
            Err(e) => {
                error!("send failed for offer {id}: {e}");
                self.console.alert(&format!("Offer failed\n{e}")).await?;
                Ok(Outcome::Failed)
            }
        }
    }

    async fn show_wallet(&mut self) -> Result<()> {
        let rows = view::wallet_rows(&self.session);
        self.console.show(&render::wallet_table(&rows)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::scripted::ScriptedConsole;
    use crate::testutil::StubBackend;
    use axum::http::StatusCode;
    use serde_json::json;

    const URI: &str = "px:invoice?addr=DEST1&asset=XPT&name=Caramel&price=500";

    fn happy_backend() -> crate::testutil::StubBuilder {
        StubBackend::builder()
            .json("/walletinfo", json!({ "balance": { "ABC": 1000 } }))
            .json(
                "/offer",
                json!({ "ABC": { "cost": 480, "fee": 5, "id": "o1" } }),
            )
    }

    #[tokio::test]
    async fn end_to_end_payment() {
        let stub = happy_backend()
            .json("/send", json!({ "result": true }))
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "ABC", "y", ""]);

        let outcome = Payer::new(&client, &mut console).pay_once().await.unwrap();
        assert_eq!(outcome, Outcome::Paid);

        let offer = stub.calls("/offer");
        assert_eq!(offer[0].get("asset").map(String::as_str), Some("XPT"));
        assert_eq!(offer[0].get("cost").map(String::as_str), Some("500"));

        let send = stub.calls("/send");
        assert_eq!(send.len(), 1);
        assert_eq!(send[0].get("id").map(String::as_str), Some("o1"));
        assert_eq!(send[0].get("addr").map(String::as_str), Some("DEST1"));

        assert!(console.shown.iter().any(|s| s.contains("▶ ABCpt") && s.contains("485 (515)")));
        assert!(console.shown.iter().any(|s| s.contains("Thank you")));
        assert_eq!(
            console.prompts.last().map(String::as_str),
            Some("Press enter to continue ")
        );
        assert!(console.alerts.is_empty());
    }

    #[tokio::test]
    async fn settlement_failure_resets_session() {
        let stub = happy_backend()
            .status("/send", StatusCode::BAD_GATEWAY, "exchanger down")
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "ABC", "y"]);

        let mut payer = Payer::new(&client, &mut console);
        let outcome = payer.pay_once().await.unwrap();
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(payer.session(), &PaySession::default());
        drop(payer);

        assert_eq!(console.alerts.len(), 1);
        assert!(console.alerts[0].starts_with("Offer failed"));
        assert!(console.alerts[0].contains("exchanger down"));
    }

    #[tokio::test]
    async fn malformed_uri_never_reaches_offer() {
        let stub = happy_backend().spawn().await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&["px:invoice?addr=A&asset=X&price=1"]);

        let outcome = Payer::new(&client, &mut console).pay_once().await.unwrap();
        assert_eq!(outcome, Outcome::Failed);
        assert!(stub.calls("/offer").is_empty());
        assert!(console.alerts[0].starts_with("Incorrect payment info format"));
    }

    #[tokio::test]
    async fn offer_failure_alerts_and_resets() {
        let stub = StubBackend::builder()
            .json("/walletinfo", json!({ "balance": { "ABC": 1000 } }))
            .status("/offer", StatusCode::INTERNAL_SERVER_ERROR, "no rate")
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI]);

        let mut payer = Payer::new(&client, &mut console);
        assert_eq!(payer.pay_once().await.unwrap(), Outcome::Failed);
        assert_eq!(payer.session(), &PaySession::default());
        drop(payer);
        assert!(console.alerts[0].starts_with("offer fail"));
    }

    #[tokio::test]
    async fn unaffordable_asset_cannot_be_selected() {
        let stub = StubBackend::builder()
            .json("/walletinfo", json!({ "balance": { "ABC": 1000, "LOW": 11 } }))
            .json(
                "/offer",
                json!({
                    "ABC": { "cost": 480, "fee": 5, "id": "o1" },
                    "LOW": { "cost": 10, "fee": 2, "id": "o2" }
                }),
            )
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "LOW", ""]);

        let outcome = Payer::new(&client, &mut console).pay_once().await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(stub.calls("/send").is_empty());
        assert!(console.alerts[0].contains("insufficient"));
        assert!(console.shown.iter().any(|s| s.contains("! LOWpt") && s.contains("12 (-1)")));
    }

    #[tokio::test]
    async fn declining_confirmation_cancels() {
        let stub = happy_backend().spawn().await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "ABC", "n"]);

        let outcome = Payer::new(&client, &mut console).pay_once().await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(stub.calls("/send").is_empty());
    }

    #[tokio::test]
    async fn wallet_failure_offers_retry() {
        let stub = StubBackend::builder()
            .status("/walletinfo", StatusCode::SERVICE_UNAVAILABLE, "node syncing")
            .json("/walletinfo", json!({ "balance": { "ABC": 1000 } }))
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&["y"]);

        let mut payer = Payer::new(&client, &mut console);
        assert_eq!(payer.pay_once().await.unwrap(), Outcome::Retry);
        // second round loads the wallet, then the input closes
        assert_eq!(payer.pay_once().await.unwrap(), Outcome::Quit);
        assert!(payer.session().wallets.contains_key("ABC"));
        drop(payer);
        assert!(console.alerts[0].contains("node syncing"));
    }

    #[tokio::test]
    async fn declined_wallet_retry_ends_with_error() {
        let stub = StubBackend::builder()
            .status("/walletinfo", StatusCode::SERVICE_UNAVAILABLE, "down")
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&["n"]);

        let res = Payer::new(&client, &mut console).run().await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn input_closing_at_thank_you_quits_without_refetch() {
        let stub = happy_backend()
            .json("/send", json!({ "result": true }))
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "ABC", "y"]);

        Payer::new(&client, &mut console).run().await.unwrap();
        assert_eq!(stub.calls("/send").len(), 1);
        assert_eq!(stub.calls("/walletinfo").len(), 1);
    }

    #[tokio::test]
    async fn overflowing_offer_alerts_and_resets() {
        let stub = StubBackend::builder()
            .json("/walletinfo", json!({ "balance": { "ABC": 1000 } }))
            .json(
                "/offer",
                json!({ "ABC": { "cost": i64::MAX, "fee": 5, "id": "o1" } }),
            )
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI]);

        let mut payer = Payer::new(&client, &mut console);
        assert_eq!(payer.pay_once().await.unwrap(), Outcome::Failed);
        assert_eq!(payer.session(), &PaySession::default());
        drop(payer);
        assert!(console.alerts[0].starts_with("offer fail"));
    }

    #[tokio::test]
    async fn run_stops_when_input_closes() {
        let stub = happy_backend()
            .json("/send", json!({ "result": true }))
            .spawn()
            .await;
        let client = stub.client();
        let mut console = ScriptedConsole::new(&[URI, "ABC", "y", ""]);

        Payer::new(&client, &mut console).run().await.unwrap();
        assert_eq!(stub.calls("/send").len(), 1);
        assert_eq!(stub.calls("/walletinfo").len(), 2);
    }
}
