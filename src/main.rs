use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use cryptowallet::cli::evaluate::EvaluateArgs;
use cryptowallet::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for cryptowallet::AppCommand {
    fn from(cmd: Commands) -> cryptowallet::AppCommand {
        match cmd {
            Commands::Track { symbol } => cryptowallet::AppCommand::Track { symbol },
            Commands::Tokens => cryptowallet::AppCommand::Tokens,
            Commands::Update => cryptowallet::AppCommand::Update,
            Commands::Watch => cryptowallet::AppCommand::Watch,
            Commands::Evaluate {
                date,
                wallet,
                assets,
                json,
            } => cryptowallet::AppCommand::Evaluate(EvaluateArgs {
                date,
                wallet,
                assets,
                json,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start tracking a token, or refresh its price
    Track {
        /// Token symbol, e.g. BTC
        symbol: String,
    },
    /// List tracked tokens and their last known prices
    Tokens,
    /// Refresh the price of every tracked token once
    Update,
    /// Refresh prices periodically until interrupted
    Watch,
    /// Compare current holdings against their value at a past date
    Evaluate {
        /// Past date to evaluate against (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Wallet name from the configuration (defaults to the first one)
        #[arg(short, long, conflicts_with = "assets")]
        wallet: Option<String>,

        /// YAML or JSON file with a list of {symbol, quantity, value}
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, matches!(cli.command, Some(Commands::Watch)));

    let result = match cli.command {
        Some(Commands::Setup) => cryptowallet::cli::setup::setup(),
        Some(cmd) => cryptowallet::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
