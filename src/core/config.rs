use crate::core::model::Holding;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Wallet {
    pub name: String,
    #[serde(default)]
    pub assets: Vec<Holding>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinCapProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CoinCapProviderConfig {
    fn default() -> Self {
        CoinCapProviderConfig {
            base_url: "https://api.coincap.io/v2".to_string(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub coincap: CoinCapProviderConfig,
}

/// Worker pool sizes, retry policy and refresh interval.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    pub update_threads: usize,
    pub history_threads: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub update_interval_secs: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            update_threads: 5,
            history_threads: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            update_interval_secs: 300,
        }
    }
}

impl PricingConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "cryptowallet", "cryptowallet")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "cryptowallet", "cryptowallet")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Finds a wallet by name, or the first configured wallet when no name is
    /// given.
    pub fn wallet(&self, name: Option<&str>) -> Option<&Wallet> {
        match name {
            Some(name) => self.wallets.iter().find(|w| w.name == name),
            None => self.wallets.first(),
        }
    }
}
