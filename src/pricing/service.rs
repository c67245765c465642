use super::aggregate::WalletEvaluation;
use super::evaluator::HistoricalEvaluator;
use super::pool::WorkerPool;
use super::retry::{RetryPolicy, RetryingFetcher};
use super::updater::{BulkPriceUpdater, UpdateSummary};
use crate::core::config::PricingConfig;
use crate::core::{
    AssetValuation, Holding, PoolError, PriceError, PriceProvider, PricedAsset, TrackedToken,
    normalize_symbol,
};
use crate::store::TokenStore;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Entry point for token tracking, bulk refresh and wallet evaluation.
///
/// Owns both worker pools; call [`PriceService::shutdown`] when done.
pub struct PriceService {
    provider: Arc<dyn PriceProvider>,
    store: Arc<dyn TokenStore>,
    fetcher: Arc<RetryingFetcher>,
    updater: BulkPriceUpdater,
    evaluator: HistoricalEvaluator,
}

impl PriceService {
    pub fn new(
        config: &PricingConfig,
        provider: Arc<dyn PriceProvider>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, PoolError> {
        let fetcher = Arc::new(RetryingFetcher::new(
            Arc::clone(&provider),
            RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_delay(),
            },
        ));
        let updater = BulkPriceUpdater::new(
            Arc::clone(&fetcher),
            Arc::clone(&store),
            WorkerPool::new("price-update", config.update_threads)?,
        );
        let evaluator = HistoricalEvaluator::new(
            Arc::clone(&provider),
            WorkerPool::new("historical-price", config.history_threads)?,
        );

        Ok(PriceService {
            provider,
            store,
            fetcher,
            updater,
            evaluator,
        })
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    /// Refreshes every tracked token. Never fails; a store that cannot be read
    /// counts as nothing to update.
    pub async fn update_all_token_prices(&self) -> UpdateSummary {
        let tokens = match self.store.find_all().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("Failed to load tracked tokens: {e}");
                return UpdateSummary::default();
            }
        };
        self.updater.update_all(tokens).await
    }

    /// Fetches a fresh price for one token, adding it to the store on first
    /// use. This is the only path where an exhausted retry surfaces.
    pub async fn track_token(&self, symbol: &str) -> Result<TrackedToken, PriceError> {
        let symbol = normalize_symbol(symbol);

        if let Some(mut token) = self.store.find_by_symbol(&symbol).await? {
            let shutdown = self.updater.pool().shutdown_signal();
            let price = self.fetcher.fetch_price(&token, &shutdown).await?;
            token.price = Some(price);
            self.store.save(&token).await?;
            info!("Updated {}'s price to {}", token.symbol, price);
            return Ok(token);
        }

        let Some(details) = self.provider.search_by_symbol(&symbol).await else {
            return Err(PriceError::TokenNotFound { symbol });
        };
        let token = TrackedToken::from(details);
        self.store.save(&token).await?;
        info!(
            "Tracking {} ({}) at {:?}",
            token.symbol, token.provider_id, token.price
        );
        Ok(token)
    }

    /// Maps symbols to provider ids, reading the store first and searching the
    /// provider for the rest. Newly found tokens are persisted; symbols that
    /// cannot be resolved are left out. Keys are normalized symbols, each
    /// searched at most once.
    pub async fn resolve_provider_ids(&self, symbols: &[String]) -> HashMap<String, String> {
        let mut symbols: Vec<String> = symbols.iter().map(|s| normalize_symbol(s)).collect();
        symbols.sort();
        symbols.dedup();
        let mut ids = HashMap::with_capacity(symbols.len());

        match self.store.find_all_by_symbols(&symbols).await {
            Ok(known) => {
                for token in known {
                    ids.insert(token.symbol, token.provider_id);
                }
            }
            Err(e) => error!("Failed to read tracked tokens: {e}"),
        }

        let mut discovered = Vec::new();
        for symbol in &symbols {
            if ids.contains_key(symbol) {
                debug!(%symbol, "Provider id HIT");
                continue;
            }
            debug!(%symbol, "Provider id MISS");
            match self.provider.search_by_symbol(symbol).await {
                Some(details) => {
                    ids.insert(symbol.clone(), details.provider_id.clone());
                    discovered.push(TrackedToken::from(details));
                }
                None => warn!("Could not fetch token details for {symbol}, skipping"),
            }
        }

        if !discovered.is_empty() {
            if let Err(e) = self.store.save_all(&discovered).await {
                warn!("Failed to save {} new tokens: {e}", discovered.len());
            }
        }
        ids
    }

    /// Evaluates a persisted wallet. Each holding is priced with the last
    /// known price of its tracked token.
    pub async fn evaluate_wallet(
        &self,
        holdings: &[Holding],
        date: NaiveDate,
    ) -> Option<WalletEvaluation> {
        let holdings: Vec<Holding> = holdings
            .iter()
            .map(|h| Holding {
                symbol: normalize_symbol(&h.symbol),
                quantity: h.quantity,
            })
            .collect();
        let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
        self.resolve_provider_ids(&symbols).await;

        let tokens: HashMap<String, TrackedToken> =
            match self.store.find_all_by_symbols(&symbols).await {
                Ok(tokens) => tokens.into_iter().map(|t| (t.symbol.clone(), t)).collect(),
                Err(e) => {
                    error!("Failed to read tracked tokens: {e}");
                    HashMap::new()
                }
            };

        let assets: Vec<PricedAsset> = holdings
            .iter()
            .filter_map(|holding| {
                let Some(token) = tokens.get(&holding.symbol) else {
                    warn!(symbol = %holding.symbol, "Token is not tracked, skipping asset");
                    return None;
                };
                if holding.quantity <= 0.0 {
                    warn!(symbol = %holding.symbol, "Non-positive quantity, skipping asset");
                    return None;
                }
                PricedAsset::from_token(token, holding.quantity)
            })
            .collect();

        self.evaluator.evaluate(assets, date).await
    }

    /// Evaluates an ad-hoc list of valuations, deriving each unit price from
    /// its current total value.
    pub async fn evaluate_valuations(
        &self,
        valuations: &[AssetValuation],
        date: NaiveDate,
    ) -> Option<WalletEvaluation> {
        let valuations: Vec<AssetValuation> = valuations
            .iter()
            .map(|v| AssetValuation {
                symbol: normalize_symbol(&v.symbol),
                ..v.clone()
            })
            .collect();
        let symbols: Vec<String> = valuations.iter().map(|v| v.symbol.clone()).collect();
        let provider_ids = self.resolve_provider_ids(&symbols).await;

        let assets: Vec<PricedAsset> = valuations
            .iter()
            .filter_map(|valuation| PricedAsset::from_valuation(valuation, &provider_ids))
            .collect();

        self.evaluator.evaluate(assets, date).await
    }

    pub fn shutdown(&self) {
        self.updater.shutdown();
        self.evaluator.shutdown();
    }
}
