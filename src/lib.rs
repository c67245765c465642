pub mod cli;
pub mod core;
pub mod pricing;
pub mod providers;
pub mod store;

use crate::cli::evaluate::EvaluateArgs;
use crate::core::config::AppConfig;
use crate::pricing::PriceService;
use crate::providers::CoinCapProvider;
use crate::store::DiskTokenStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Track { symbol: String },
    Tokens,
    Update,
    Watch,
    Evaluate(EvaluateArgs),
}

/// Wires the CoinCap provider and the on-disk token store into a service.
pub fn build_service(config: &AppConfig) -> Result<PriceService> {
    let data_path = config.default_data_path()?;
    debug!("Using data path {}", data_path.display());

    let store = Arc::new(DiskTokenStore::open(&data_path)?);
    let provider = Arc::new(CoinCapProvider::new(&config.providers.coincap)?);
    Ok(PriceService::new(&config.pricing, provider, store)?)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Crypto wallet starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = Arc::new(build_service(&config)?);
    let result = match command {
        AppCommand::Track { symbol } => cli::tokens::track(&service, &symbol).await,
        AppCommand::Tokens => cli::tokens::run(&service).await,
        AppCommand::Update => cli::update::run(&service).await,
        AppCommand::Watch => {
            cli::update::watch(Arc::clone(&service), config.pricing.update_interval()).await
        }
        AppCommand::Evaluate(args) => cli::evaluate::run(&service, &config, &args).await,
    };

    service.shutdown();
    result
}
