//! pointpay — terminal client for the point payment demo.
//!
//! `pay` runs the payer wallet flow against the payer backend; `order` and
//! `list` drive the merchant backend. Both backends are plain HTTP+JSON
//! services configured through the environment (see [`config::Config`]).

mod api;
mod config;
mod console;
mod errors;
mod invoice;
mod merchant;
mod orders;
mod payer;
mod render;
mod session;
mod view;

#[cfg(test)]
mod testutil;

use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::BackendClient;
use config::Config;
use console::{Console, StdConsole};

#[derive(Parser, Debug)]
#[command(name = "pointpay", version, about = "Point payment demo client")]
struct Cli {
    /// Payer wallet backend root (overrides PAYER_URL)
    #[arg(long, global = true)]
    payer_url: Option<String>,

    /// Merchant backend root (overrides MERCHANT_URL)
    #[arg(long, global = true)]
    merchant_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pay invoices from the wallet, interactively
    Pay,
    /// Create a new invoice and print it with a QR code
    Order {
        /// Catalog item to order (overrides ORDER_ITEM)
        #[arg(long)]
        item: Option<String>,
    },
    /// Poll the merchant order list until interrupted
    List {
        /// Seconds between polls (overrides POLL_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Validate an invoice URI and print its fields
    Parse { uri: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the interactive UI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(raw) = &cli.payer_url {
        config.payer_url = config::parse_base_url("--payer-url", raw)?;
    }
    if let Some(raw) = &cli.merchant_url {
        config.merchant_url = config::parse_base_url("--merchant-url", raw)?;
    }

    let http = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    let client = BackendClient::new(http, config.payer_url.clone(), config.merchant_url.clone());
    let mut console = StdConsole::new();

    match cli.command {
        Command::Pay => {
            info!("Payer backend: {}", config.payer_url);
            payer::Payer::new(&client, &mut console).run().await?;
        }
        Command::Order { item } => {
            let item = item.unwrap_or(config.order_item);
            info!("Ordering {item:?} from {}", config.merchant_url);
            match merchant::create_invoice(&client, &item).await {
                Ok(card) => console.show(&card).await?,
                Err(e) => {
                    console.alert(&format!("order fail\n{e}")).await?;
                    return Err(e.into());
                }
            }
        }
        Command::List { interval } => {
            let secs = interval.unwrap_or(config.poll_interval_secs);
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            merchant::run_list(&client, &mut console, Duration::from_secs(secs), shutdown).await?;
        }
        Command::Parse { uri } => {
            let inv = invoice::parse_invoice_uri(&uri)?;
            console
                .show(&format!(
                    "name:  {}\naddr:  {}\nasset: {}\nprice: {}\nuri:   {}",
                    inv.name,
                    inv.addr,
                    inv.asset,
                    inv.price,
                    inv.to_uri()
                ))
                .await?;
            for (key, value) in &inv.extra {
                console.show(&format!("{key}: {value} (ignored)")).await?;
            }
        }
    }

    Ok(())
}
