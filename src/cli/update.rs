use super::ui;
use crate::pricing::{PriceService, UpdateSummary, spawn_price_updates};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn display_summary(summary: &UpdateSummary) -> String {
    let updated = summary.updated.to_string();
    let unchanged = summary.unchanged.to_string();
    let unchanged_style = if summary.unchanged > 0 {
        ui::StyleType::Error
    } else {
        ui::StyleType::Subtle
    };
    format!(
        "{} {}  {} {}",
        ui::style_text("Updated:", ui::StyleType::TotalLabel),
        ui::style_text(&updated, ui::StyleType::TotalValue),
        ui::style_text("Unchanged:", ui::StyleType::TotalLabel),
        ui::style_text(&unchanged, unchanged_style)
    )
}

/// Runs one bulk price update over every tracked token.
pub async fn run(service: &PriceService) -> Result<()> {
    let spinner = ui::new_spinner("Updating token prices...");
    let summary = service.update_all_token_prices().await;
    spinner.finish_and_clear();

    println!("{}", display_summary(&summary));
    Ok(())
}

/// Refreshes prices every `interval` until Ctrl-C.
pub async fn watch(service: Arc<PriceService>, interval: Duration) -> Result<()> {
    let handle = spawn_price_updates(Arc::clone(&service), interval);

    let signal = tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C");
    info!("Stopping price updates...");
    handle.abort();
    service.shutdown();
    signal
}
