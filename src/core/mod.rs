//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod price;

// Re-export main types for cleaner imports
pub use error::{PoolError, PriceError};
pub use model::{
    AssetValuation, HistoricalPricePoint, Holding, PricedAsset, TokenDetails, TrackedToken,
    normalize_symbol,
};
pub use price::PriceProvider;
