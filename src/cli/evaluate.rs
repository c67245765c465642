use super::ui;
use crate::core::AssetValuation;
use crate::core::config::AppConfig;
use crate::pricing::{PriceService, WalletEvaluation};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::Cell;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const NO_RESULTS: &str = "No results to show";

#[derive(Debug, Clone)]
pub struct EvaluateArgs {
    pub date: NaiveDate,
    pub wallet: Option<String>,
    pub assets: Option<PathBuf>,
    pub json: bool,
}

impl WalletEvaluation {
    pub fn display_as_table(&self, title: &str, date: NaiveDate) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(""),
            ui::header_cell("Asset"),
            ui::header_cell("Performance"),
        ]);
        table.add_row(vec![
            Cell::new("Best"),
            Cell::new(&self.best_asset),
            ui::change_cell(self.best_performance),
        ]);
        table.add_row(vec![
            Cell::new("Worst"),
            Cell::new(&self.worst_asset),
            ui::change_cell(self.worst_performance),
        ]);

        let mut output = format!(
            "{} {}\n\n",
            ui::style_text(title, ui::StyleType::Title),
            ui::style_text(&format!("since {date}"), ui::StyleType::Subtle)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Total Value at Date (USD)", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total), ui::StyleType::TotalValue)
        ));
        output
    }
}

/// Renders an evaluation outcome as a table, or as JSON when `json` is set.
/// An absent evaluation renders as [`NO_RESULTS`].
pub fn render(
    evaluation: Option<&WalletEvaluation>,
    title: &str,
    date: NaiveDate,
    json: bool,
) -> Result<String> {
    match (evaluation, json) {
        (Some(evaluation), true) => Ok(serde_json::to_string_pretty(evaluation)?),
        (Some(evaluation), false) => Ok(evaluation.display_as_table(title, date)),
        (None, true) => Ok(serde_json::json!({ "message": NO_RESULTS }).to_string()),
        (None, false) => Ok(ui::style_text(NO_RESULTS, ui::StyleType::Error)),
    }
}

/// Reads an ad-hoc list of `{symbol, quantity, value}` entries. `.json` files
/// are parsed as JSON, anything else as YAML.
pub fn load_valuations(path: &Path) -> Result<Vec<AssetValuation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read assets file: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let valuations = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse assets file: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse assets file: {}", path.display()))?
    };
    Ok(valuations)
}

/// Evaluates either the given assets file or a configured wallet.
pub async fn evaluate(
    service: &PriceService,
    config: &AppConfig,
    args: &EvaluateArgs,
) -> Result<(String, Option<WalletEvaluation>)> {
    if let Some(path) = &args.assets {
        let valuations = load_valuations(path)?;
        debug!(assets = valuations.len(), "Evaluating assets file");
        let title = path
            .file_name()
            .map_or("Assets".to_string(), |name| name.to_string_lossy().to_string());
        return Ok((title, service.evaluate_valuations(&valuations, args.date).await));
    }

    let wallet = config
        .wallet(args.wallet.as_deref())
        .ok_or_else(|| match &args.wallet {
            Some(name) => anyhow!("No wallet named '{name}' in configuration"),
            None => anyhow!("No wallets configured"),
        })?;
    debug!(wallet = %wallet.name, "Evaluating wallet");
    let evaluation = service.evaluate_wallet(&wallet.assets, args.date).await;
    Ok((wallet.name.clone(), evaluation))
}

pub async fn run(service: &PriceService, config: &AppConfig, args: &EvaluateArgs) -> Result<()> {
    let spinner = ui::new_spinner("Fetching historical prices...");
    let result = evaluate(service, config, args).await;
    spinner.finish_and_clear();

    let (title, evaluation) = result?;
    println!("{}", render(evaluation.as_ref(), &title, args.date, args.json)?);
    Ok(())
}
