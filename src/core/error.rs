use thiserror::Error;

/// Failures surfaced by the single-token price paths.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Failed to fetch price for {symbol}")]
    FetchFailed { symbol: String },

    #[error("Price fetch for {symbol} was cancelled")]
    Cancelled { symbol: String },

    #[error("Could not fetch token details for {symbol}")]
    TokenNotFound { symbol: String },

    #[error("Token store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Worker pool '{0}' has been shut down")]
    ShutDown(&'static str),

    #[error("Worker pool '{0}' needs at least one worker")]
    Empty(&'static str),
}
