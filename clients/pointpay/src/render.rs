//! Terminal rendering of the view models in [`crate::view`].

use std::fmt::Write;

use qrcode::render::unicode;
use qrcode::QrCode;

use crate::errors::Result;
use crate::view::{Confirmation, InvoiceCard, InvoiceSummary, OrderRow, WalletRow};

/// Wallet table. Payable rows get a `▶` pointer, short rows a `!` marker.
pub fn wallet_table(rows: &[WalletRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<10} {:>10}   {:<20}", "asset", "balance", "cost (remainder)");
    for row in rows {
        let (quote, marker) = match row.quote {
            Some(q) if q.payable => (format!("{} ({})", q.required, q.remainder), "▶"),
            Some(q) => (format!("{} ({})", q.required, q.remainder), "!"),
            None => ("-".to_string(), " "),
        };
        let _ = writeln!(
            out,
            "{marker} {:<10} {:>10} → {:<20}",
            row.display_name, row.balance, quote
        );
    }
    out
}

pub fn invoice_summary(summary: &InvoiceSummary) -> String {
    format!(
        "Item:  {}\nAsset: {}\nPrice: {} pt\n",
        summary.name, summary.asset, summary.price
    )
}

pub fn confirmation(c: &Confirmation) -> String {
    format!(
        "Pay to:  {}\n\
         Send:    {} {} (as {} {})\n\
         Fee:     {} {}\n\
         Total:   {} {}\n",
        c.dest_addr,
        c.cost,
        c.funding_asset,
        c.price,
        c.target_asset,
        c.fee,
        c.funding_asset,
        c.total,
        c.funding_asset
    )
}

/// ANSI clear-screen and cursor-home, so each poll redraws the table in place.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn order_table(rows: &[OrderRow], updated: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26} {:<36} {:>8} {:<8} {:<8} {:<9} {:<9}",
        "item", "address", "price", "asset", "status", "timeout", "modified"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:<26} {:<36} {:>8} {:<8} {:<8} {:<9} {:<9}",
            r.item, r.addr, r.price, r.asset, r.status, r.timeout, r.last_modify
        );
    }
    let _ = writeln!(out, "last updated {updated}");
    out
}

pub fn invoice_card(card: &InvoiceCard) -> Result<String> {
    Ok(format!(
        "{}\n\
         Item:    {}\n\
         Address: {}\n\
         Asset:   {}\n\
         Price:   {}\n\
         URI:     {}\n",
        qr(&card.uri)?,
        card.name,
        card.addr,
        card.asset,
        card.price,
        card.uri
    ))
}

/// Scannable QR code of `text` using half-block characters.
pub fn qr(text: &str) -> Result<String> {
    let code = QrCode::new(text.as_bytes())?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Affordability;

    #[test]
    fn wallet_table_marks_payable_and_short_rows() {
        let rows = vec![
            WalletRow {
                symbol: "ABC".to_string(),
                display_name: "ABCpt".to_string(),
                balance: 1000,
                quote: Some(Affordability {
                    required: 485,
                    remainder: 515,
                    payable: true,
                }),
            },
            WalletRow {
                symbol: "XPT".to_string(),
                display_name: "XPTpt".to_string(),
                balance: 11,
                quote: Some(Affordability {
                    required: 12,
                    remainder: -1,
                    payable: false,
                }),
            },
        ];
        let text = wallet_table(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("▶ ABCpt"));
        assert!(lines[1].contains("485 (515)"));
        assert!(lines[2].starts_with("! XPTpt"));
        assert!(lines[2].contains("12 (-1)"));
    }

    #[test]
    fn qr_renders_for_invoice_uri() {
        let art = qr("px:invoice?addr=A&asset=X&name=N&price=1").unwrap();
        assert!(art.lines().count() > 10);
    }
}
