pub mod aggregate;
pub mod evaluator;
pub mod pool;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod updater;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{EvaluationAggregate, WalletEvaluation, round_half_up};
pub use evaluator::{HistoricalEvaluator, evaluation_window};
pub use pool::{Shutdown, WorkerPool};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use scheduler::spawn_price_updates;
pub use service::PriceService;
pub use updater::{BulkPriceUpdater, UpdateSummary};
