//! Pricing abstractions

use crate::core::model::{HistoricalPricePoint, TokenDetails};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Remote source of current and historical token prices.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Latest price for a provider id. `Ok(None)` means the provider has no
    /// price for it; `Err` is a transient network, HTTP or decoding failure.
    async fn current_price(&self, provider_id: &str) -> Result<Option<f64>>;

    /// Exact-match symbol lookup. Errors are logged and reported as `None`.
    async fn search_by_symbol(&self, symbol: &str) -> Option<TokenDetails>;

    /// First price point within `[start, end)`, if any.
    async fn historical_price(
        &self,
        provider_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<HistoricalPricePoint>>;
}
