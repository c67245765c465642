pub mod disk;
pub mod memory;

use crate::core::TrackedToken;
use anyhow::Result;
use async_trait::async_trait;

pub use disk::DiskTokenStore;
pub use memory::MemoryTokenStore;

/// Persistence for tracked tokens, keyed by their unique symbol.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<TrackedToken>>;

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TrackedToken>>;

    async fn find_all_by_symbols(&self, symbols: &[String]) -> Result<Vec<TrackedToken>> {
        let mut tokens = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(token) = self.find_by_symbol(symbol).await? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Inserts the token or replaces the one stored under its symbol.
    async fn save(&self, token: &TrackedToken) -> Result<()>;

    async fn save_all(&self, tokens: &[TrackedToken]) -> Result<()> {
        for token in tokens {
            self.save(token).await?;
        }
        Ok(())
    }
}
