use super::pool::Shutdown;
use crate::core::{PriceError, PriceProvider, TrackedToken};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one.
    pub max_retries: u32,
    /// Wait before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
}

/// Fetches the current price of one token, retrying empty results and
/// transient provider errors with a linear backoff.
pub struct RetryingFetcher {
    provider: Arc<dyn PriceProvider>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(provider: Arc<dyn PriceProvider>, policy: RetryPolicy) -> Self {
        RetryingFetcher { provider, policy }
    }

    /// Returns the first present price, or [`PriceError::FetchFailed`] after
    /// `max_retries + 1` attempts. A shutdown observed during a backoff sleep
    /// ends the loop with [`PriceError::Cancelled`].
    #[instrument(name = "FetchPriceWithRetry", skip(self, token, shutdown), fields(symbol = %token.symbol))]
    pub async fn fetch_price(
        &self,
        token: &TrackedToken,
        shutdown: &Shutdown,
    ) -> Result<f64, PriceError> {
        let mut shutdown = shutdown.clone();
        let max_retries = self.policy.max_retries;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.policy.base_delay * attempt;
                debug!(attempt, ?delay, "Backing off before retry");
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        warn!("Shutdown requested, abandoning price fetch for {}", token.symbol);
                        return Err(PriceError::Cancelled {
                            symbol: token.symbol.clone(),
                        });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            match self.provider.current_price(&token.provider_id).await {
                Ok(Some(price)) => {
                    debug!(attempt, price, "Fetched price");
                    return Ok(price);
                }
                Ok(None) => warn!(
                    "Attempt {}/{}: Price not found for {}",
                    attempt, max_retries, token.symbol
                ),
                Err(e) => warn!(
                    "Attempt {}/{} failed for {}: {}",
                    attempt, max_retries, token.symbol, e
                ),
            }
        }

        Err(PriceError::FetchFailed {
            symbol: token.symbol.clone(),
        })
    }
}
