use super::ui;
use crate::core::TrackedToken;
use crate::pricing::PriceService;
use crate::store::TokenStore;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_as_table(tokens: &[TrackedToken]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Provider Id"),
        ui::header_cell("Price (USD)"),
    ]);

    for token in tokens {
        table.add_row(vec![
            Cell::new(&token.symbol),
            Cell::new(&token.provider_id),
            ui::format_optional_cell(token.price, |p| format!("{p:.2}")),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Tracked Tokens", ui::StyleType::Title),
        table
    )
}

/// Lists every tracked token with its last known price.
pub async fn run(service: &PriceService) -> Result<()> {
    let tokens = service.store().find_all().await?;
    if tokens.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No tokens tracked yet. Use `track <SYMBOL>` to add one.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    println!("{}", display_as_table(&tokens));
    Ok(())
}

/// Starts tracking `symbol`, or refreshes its price when already tracked.
pub async fn track(service: &PriceService, symbol: &str) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {}...", symbol.to_uppercase()));
    let result = service.track_token(symbol).await;
    spinner.finish_and_clear();

    let token = result?;
    let price = token
        .price
        .map_or("N/A".to_string(), |p| format!("{p:.2}"));
    println!(
        "{} ({}): {}",
        ui::style_text(&token.symbol, ui::StyleType::TotalLabel),
        token.provider_id,
        ui::style_text(&price, ui::StyleType::TotalValue)
    );
    Ok(())
}
