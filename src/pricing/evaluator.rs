use super::aggregate::{EvaluationAggregate, WalletEvaluation};
use super::pool::WorkerPool;
use crate::core::{PriceProvider, PricedAsset};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// One-minute window on `date` at the current UTC hour and minute.
///
/// Requested at one-minute granularity it holds at most one price point, the
/// price "as of" `date` at the same time of day as `now`.
pub fn evaluation_window(date: NaiveDate, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN);
    let start = date.and_time(time).and_utc();
    (start, start + Duration::minutes(1))
}

/// Values a list of assets at a past date and picks the best and worst
/// performer since then, fetching one historical price per asset
/// concurrently.
pub struct HistoricalEvaluator {
    provider: Arc<dyn PriceProvider>,
    pool: WorkerPool,
}

impl HistoricalEvaluator {
    pub fn new(provider: Arc<dyn PriceProvider>, pool: WorkerPool) -> Self {
        HistoricalEvaluator { provider, pool }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub async fn evaluate(&self, assets: Vec<PricedAsset>, date: NaiveDate) -> Option<WalletEvaluation> {
        self.evaluate_at(assets, date, Utc::now()).await
    }

    /// Same as [`HistoricalEvaluator::evaluate`] with an explicit clock.
    pub async fn evaluate_at(
        &self,
        assets: Vec<PricedAsset>,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<WalletEvaluation> {
        if assets.is_empty() {
            debug!("No assets to evaluate");
            return None;
        }

        let (start, end) = evaluation_window(date, now);
        info!(assets = assets.len(), %start, %end, "Evaluating assets at past date");

        let aggregate = Arc::new(Mutex::new(EvaluationAggregate::new()));
        let completed = self
            .pool
            .run_all(assets, |asset| {
                let provider = Arc::clone(&self.provider);
                let aggregate = Arc::clone(&aggregate);
                async move {
                    let Some(past_price) =
                        fetch_past_price(provider.as_ref(), &asset, start, end).await
                    else {
                        return;
                    };
                    // Total, best and worst move together under one lock.
                    aggregate.lock().await.record(
                        &asset.symbol,
                        asset.quantity,
                        asset.current_unit_price,
                        past_price,
                    );
                }
            })
            .await;

        if let Err(e) = completed {
            error!("Unexpected error while waiting for historical price tasks: {e}");
        }

        let aggregate = std::mem::take(&mut *aggregate.lock().await);
        let evaluation = aggregate.finalize();
        if evaluation.is_none() {
            info!("No historical data for any asset");
        }
        evaluation
    }

    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

async fn fetch_past_price(
    provider: &dyn PriceProvider,
    asset: &PricedAsset,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<f64> {
    match provider
        .historical_price(&asset.provider_id, start, end)
        .await
    {
        Ok(Some(point)) => point.price(),
        Ok(None) => {
            debug!(symbol = %asset.symbol, "No historical price point");
            None
        }
        Err(e) => {
            error!("Error fetching historical price for {}: {}", asset.symbol, e);
            None
        }
    }
}
