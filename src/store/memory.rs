use super::TokenStore;
use crate::core::TrackedToken;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory token store using a HashMap behind a Mutex
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<HashMap<String, TrackedToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_tokens(tokens: Vec<TrackedToken>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().await;
            for token in tokens {
                inner.insert(token.symbol.clone(), token);
            }
        }
        store
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find_all(&self) -> Result<Vec<TrackedToken>> {
        let tokens = self.inner.lock().await;
        let mut all: Vec<_> = tokens.values().cloned().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(all)
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TrackedToken>> {
        let tokens = self.inner.lock().await;
        let token = tokens.get(symbol).cloned();
        debug!(symbol, found = token.is_some(), "Token lookup");
        Ok(token)
    }

    async fn save(&self, token: &TrackedToken) -> Result<()> {
        let mut tokens = self.inner.lock().await;
        debug!(symbol = %token.symbol, "Token SAVE");
        tokens.insert(token.symbol.clone(), token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryTokenStore::new();

        // Initially, store is empty
        assert!(store.find_by_symbol("BTC").await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());

        store
            .save(&TrackedToken::new("bitcoin", "BTC", Some(1.0)))
            .await
            .unwrap();
        // Saving again replaces the price
        store
            .save(&TrackedToken::new("bitcoin", "BTC", Some(2.0)))
            .await
            .unwrap();

        let btc = store.find_by_symbol("BTC").await.unwrap().unwrap();
        assert_eq!(btc.price, Some(2.0));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_by_symbols_skips_unknown() {
        let store = MemoryTokenStore::with_tokens(vec![
            TrackedToken::new("bitcoin", "BTC", Some(1.0)),
            TrackedToken::new("ethereum", "ETH", None),
        ])
        .await;

        let symbols = vec!["ETH".to_string(), "DOGE".to_string()];
        let found = store.find_all_by_symbols(&symbols).await.unwrap();
        assert_eq!(found, vec![TrackedToken::new("ethereum", "ETH", None)]);

        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].symbol, "BTC");
        assert_eq!(all[1].symbol, "ETH");
    }
}
