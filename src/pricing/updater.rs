use super::pool::{Shutdown, WorkerPool};
use super::retry::RetryingFetcher;
use crate::core::TrackedToken;
use crate::store::TokenStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counts of one bulk update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated: usize,
    pub unchanged: usize,
}

impl UpdateSummary {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged
    }
}

/// Refreshes the price of every tracked token on a bounded pool.
pub struct BulkPriceUpdater {
    fetcher: Arc<RetryingFetcher>,
    store: Arc<dyn TokenStore>,
    pool: WorkerPool,
}

impl BulkPriceUpdater {
    pub fn new(fetcher: Arc<RetryingFetcher>, store: Arc<dyn TokenStore>, pool: WorkerPool) -> Self {
        BulkPriceUpdater {
            fetcher,
            store,
            pool,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Fetches and persists a new price for each token. A token whose fetch or
    /// save fails keeps its last-known price; no single failure aborts the
    /// others. Returns once every task has resolved.
    pub async fn update_all(&self, tokens: Vec<TrackedToken>) -> UpdateSummary {
        if tokens.is_empty() {
            warn!("No tokens found. Skipping update.");
            return UpdateSummary::default();
        }

        info!(tokens = tokens.len(), "Starting token price update...");
        let shutdown = self.pool.shutdown_signal();
        let outcomes = self
            .pool
            .run_all(tokens, |token| {
                let fetcher = Arc::clone(&self.fetcher);
                let store = Arc::clone(&self.store);
                let shutdown = shutdown.clone();
                async move { refresh_token(token, &fetcher, store.as_ref(), &shutdown).await }
            })
            .await;

        let summary = match outcomes {
            Ok(outcomes) => {
                let updated = outcomes.iter().filter(|updated| **updated).count();
                UpdateSummary {
                    updated,
                    unchanged: outcomes.len() - updated,
                }
            }
            Err(e) => {
                error!("Token price update could not run: {e}");
                UpdateSummary::default()
            }
        };

        info!(
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Completed token price update!"
        );
        summary
    }

    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

async fn refresh_token(
    mut token: TrackedToken,
    fetcher: &RetryingFetcher,
    store: &dyn TokenStore,
    shutdown: &Shutdown,
) -> bool {
    let price = match fetcher.fetch_price(&token, shutdown).await {
        Ok(price) => price,
        Err(e) => {
            warn!("Failed to update price for {}: {e}", token.symbol);
            return false;
        }
    };

    token.price = Some(price);
    match store.save(&token).await {
        Ok(()) => {
            info!("Updated {}'s price to {}", token.symbol, price);
            true
        }
        Err(e) => {
            warn!("Failed to save price for {}: {e}", token.symbol);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::retry::RetryPolicy;
    use crate::pricing::test_support::{FakeProvider, Reply};
    use crate::store::memory::MemoryTokenStore;
    use std::time::Duration;

    fn updater(
        provider: Arc<FakeProvider>,
        store: Arc<MemoryTokenStore>,
        threads: usize,
    ) -> BulkPriceUpdater {
        let fetcher = RetryingFetcher::new(
            provider,
            RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(5),
            },
        );
        BulkPriceUpdater::new(
            Arc::new(fetcher),
            store,
            WorkerPool::new("update", threads).unwrap(),
        )
    }

    fn tokens() -> Vec<TrackedToken> {
        vec![
            TrackedToken::new("bitcoin", "BTC", Some(40000.0)),
            TrackedToken::new("ethereum", "ETH", Some(2500.0)),
            TrackedToken::new("solana", "SOL", Some(90.0)),
        ]
    }

    #[tokio::test]
    async fn test_empty_token_list_is_a_no_op() {
        let provider = Arc::new(FakeProvider::new());
        let store = Arc::new(MemoryTokenStore::new());
        let updater = updater(Arc::clone(&provider), store, 2);

        let summary = updater.update_all(vec![]).await;

        assert_eq!(summary, UpdateSummary::default());
        assert_eq!(provider.total_current_calls(), 0);
    }

    #[tokio::test]
    async fn test_every_task_resolves_before_return() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_delay(Duration::from_millis(10))
                .with_current("bitcoin", &[Reply::Price(50000.0)])
                .with_current("ethereum", &[Reply::Fail, Reply::Price(3000.0)])
                .with_current("solana", &[Reply::Empty]),
        );
        let store = Arc::new(MemoryTokenStore::with_tokens(tokens()).await);
        let updater = updater(Arc::clone(&provider), Arc::clone(&store), 2);

        let summary = updater.update_all(tokens()).await;

        assert_eq!(summary, UpdateSummary { updated: 2, unchanged: 1 });
        assert_eq!(provider.current_calls("bitcoin"), 1);
        assert_eq!(provider.current_calls("ethereum"), 2);
        assert_eq!(provider.current_calls("solana"), 3);

        let btc = store.find_by_symbol("BTC").await.unwrap().unwrap();
        assert_eq!(btc.price, Some(50000.0));
        let eth = store.find_by_symbol("ETH").await.unwrap().unwrap();
        assert_eq!(eth.price, Some(3000.0));
        // Failed token keeps its last-known price
        let sol = store.find_by_symbol("SOL").await.unwrap().unwrap();
        assert_eq!(sol.price, Some(90.0));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_other_tokens() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_current("bitcoin", &[Reply::Fail])
                .with_current("ethereum", &[Reply::Fail])
                .with_current("solana", &[Reply::Price(120.0)]),
        );
        let store = Arc::new(MemoryTokenStore::new());
        let updater = updater(Arc::clone(&provider), Arc::clone(&store), 1);

        let summary = updater.update_all(tokens()).await;

        assert_eq!(summary, UpdateSummary { updated: 1, unchanged: 2 });
        assert_eq!(summary.total(), 3);
        let sol = store.find_by_symbol("SOL").await.unwrap().unwrap();
        assert_eq!(sol.price, Some(120.0));
        assert!(store.find_by_symbol("BTC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shut_down_updater_changes_nothing() {
        let provider = Arc::new(FakeProvider::new().with_current("bitcoin", &[Reply::Price(1.0)]));
        let store = Arc::new(MemoryTokenStore::new());
        let updater = updater(Arc::clone(&provider), store, 2);
        updater.shutdown();

        let summary = updater.update_all(tokens()).await;

        assert_eq!(summary.total(), 0);
        assert_eq!(provider.total_current_calls(), 0);
    }
}
