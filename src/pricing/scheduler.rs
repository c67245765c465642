//! Periodic refresh of every tracked token's price.

use super::service::PriceService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::info;

/// Spawns a loop that runs a bulk price update every `period`, starting
/// immediately. Abort the returned handle to stop it.
pub fn spawn_price_updates(service: Arc<PriceService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Price update scheduler started ({:?} interval)", period);

        let mut ticker = interval(period);
        // A slow batch should not trigger a burst of catch-up runs
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let summary = service.update_all_token_prices().await;
            info!(
                "Scheduled price update completed: {} updated, {} unchanged",
                summary.updated, summary.unchanged
            );
        }
    })
}
