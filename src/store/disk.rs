use super::TokenStore;
use crate::core::TrackedToken;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Token store persisted in a fjall partition, one JSON value per symbol.
pub struct DiskTokenStore {
    keyspace: Keyspace,
    tokens: PartitionHandle,
}

impl DiskTokenStore {
    pub fn open(data_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_path)
            .with_context(|| format!("Failed to create directory: {}", data_path.display()))?;

        let db_path = data_path.join("tokens_db");
        let keyspace = Config::new(&db_path)
            .open()
            .with_context(|| format!("Failed to open token store at {}", db_path.display()))?;
        let tokens = keyspace.open_partition("tokens", PartitionCreateOptions::default())?;
        debug!("Opened token store at {}", db_path.display());

        Ok(Self { keyspace, tokens })
    }

    fn decode(symbol: &[u8], value: &[u8]) -> Result<TrackedToken> {
        serde_json::from_slice(value).with_context(|| {
            format!(
                "Corrupt token entry for {}",
                String::from_utf8_lossy(symbol)
            )
        })
    }
}

#[async_trait]
impl TokenStore for DiskTokenStore {
    async fn find_all(&self) -> Result<Vec<TrackedToken>> {
        let mut tokens = Vec::new();
        for entry in self.tokens.iter() {
            let (symbol, value) = entry?;
            tokens.push(Self::decode(&symbol, &value)?);
        }
        Ok(tokens)
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TrackedToken>> {
        match self.tokens.get(symbol.as_bytes())? {
            Some(value) => {
                debug!(symbol, "Token HIT");
                Ok(Some(Self::decode(symbol.as_bytes(), &value)?))
            }
            None => {
                debug!(symbol, "Token MISS");
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &TrackedToken) -> Result<()> {
        self.tokens
            .insert(token.symbol.as_bytes(), serde_json::to_vec(token)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(symbol = %token.symbol, "Token SAVE");
        Ok(())
    }

    async fn save_all(&self, tokens: &[TrackedToken]) -> Result<()> {
        for token in tokens {
            self.tokens
                .insert(token.symbol.as_bytes(), serde_json::to_vec(token)?)?;
        }
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(count = tokens.len(), "Token SAVE batch");
        Ok(())
    }
}
