//! Merchant side: invoice creation and the order-list poller.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::BackendClient;
use crate::console::Console;
use crate::errors::Result;
use crate::render;
use crate::view;

/// Request a brand-new invoice for `item` and render it with its QR code.
pub async fn create_invoice(client: &BackendClient, item: &str) -> Result<String> {
    let created = client.order(item).await?;
    info!("Invoice created: {}", created.uri);
    render::invoice_card(&view::invoice_card(&created))
}

/// Fetch the order list once and render it. `None` when the fetch failed;
/// the failure is logged and the cycle skipped.
pub async fn poll_once(client: &BackendClient) -> Option<String> {
    match client.list().await {
        Ok(records) => {
            let rows = view::order_rows(&records);
            Some(render::order_table(&rows, &view::clock(Utc::now().timestamp())))
        }
        Err(e) => {
            warn!("Order list fetch failed: {e}");
            None
        }
    }
}

/// Poll until `shutdown` resolves. The next fetch is scheduled only after
/// the previous one has finished, so requests never overlap.
pub async fn run_list<C, F>(
    client: &BackendClient,
    console: &mut C,
    interval: Duration,
    shutdown: F,
) -> Result<()>
where
    C: Console,
    F: Future<Output = ()>,
{
    info!("Polling order list every {}s", interval.as_secs());
    tokio::pin!(shutdown);

    loop {
        let tick = async {
            if let Some(table) = poll_once(client).await {
                console.show(&format!("{}{table}", render::CLEAR_SCREEN)).await?;
            }
            tokio::time::sleep(interval).await;
            Ok::<(), crate::errors::PayError>(())
        };

        tokio::select! {
            res = tick => res?,
            _ = &mut shutdown => {
                info!("Order list poller stopped");
                return Ok(());
            }
        }
    }
}
