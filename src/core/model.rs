//! Token and asset types shared by the pricing engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Canonical form of a token symbol, used as the store key.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// A token whose price is kept current by the bulk updater.
///
/// `symbol` is unique across the store. `price` stays `None` until the first
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedToken {
    pub provider_id: String,
    pub symbol: String,
    pub price: Option<f64>,
}

impl TrackedToken {
    pub fn new(provider_id: &str, symbol: &str, price: Option<f64>) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            symbol: symbol.to_string(),
            price,
        }
    }
}

/// Result of a symbol search against the price provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDetails {
    pub provider_id: String,
    pub symbol: String,
    pub price: f64,
}

impl From<TokenDetails> for TrackedToken {
    fn from(details: TokenDetails) -> Self {
        TrackedToken {
            provider_id: details.provider_id,
            symbol: normalize_symbol(&details.symbol),
            price: Some(details.price),
        }
    }
}

/// A single point of a historical price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPricePoint {
    #[serde(rename = "priceUsd")]
    pub price_usd: String,
    #[serde(rename = "time")]
    pub timestamp_millis: i64,
}

impl HistoricalPricePoint {
    /// Parses the provider's decimal string. Unparseable or non-finite values
    /// are treated as absent data.
    pub fn price(&self) -> Option<f64> {
        match self.price_usd.trim().parse::<f64>() {
            Ok(price) if price.is_finite() => Some(price),
            Ok(_) | Err(_) => {
                warn!(
                    price = %self.price_usd,
                    "Ignoring malformed historical price"
                );
                None
            }
        }
    }
}

/// A holding of a persisted wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
}

/// A holding from a flattened request, where only the current total value is
/// known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
    pub symbol: String,
    pub quantity: f64,
    pub value: f64,
}

/// Normalized evaluation input. Immutable for the duration of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedAsset {
    pub symbol: String,
    pub provider_id: String,
    pub quantity: f64,
    pub current_unit_price: f64,
}

impl PricedAsset {
    pub fn new(symbol: &str, provider_id: &str, quantity: f64, current_unit_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            provider_id: provider_id.to_string(),
            quantity,
            current_unit_price,
        }
    }

    /// Builds an asset from a persisted holding, reading the live unit price
    /// from its owning token. Returns `None` while the token has no price.
    pub fn from_token(token: &TrackedToken, quantity: f64) -> Option<Self> {
        let Some(price) = token.price else {
            warn!(symbol = %token.symbol, "Token has no known price, skipping asset");
            return None;
        };
        Some(Self::new(&token.symbol, &token.provider_id, quantity, price))
    }

    /// Builds an asset from a flattened valuation, deriving the unit price as
    /// `value / quantity` and the provider id from `provider_ids`.
    pub fn from_valuation(
        valuation: &AssetValuation,
        provider_ids: &HashMap<String, String>,
    ) -> Option<Self> {
        let Some(provider_id) = provider_ids.get(&valuation.symbol) else {
            warn!(symbol = %valuation.symbol, "No provider id for symbol, skipping asset");
            return None;
        };
        if valuation.quantity <= 0.0 {
            warn!(
                symbol = %valuation.symbol,
                quantity = valuation.quantity,
                "Non-positive quantity, skipping asset"
            );
            return None;
        }

        let unit_price = valuation.value / valuation.quantity;
        debug!(symbol = %valuation.symbol, unit_price, "Derived unit price from valuation");
        Some(Self::new(
            &valuation.symbol,
            provider_id,
            valuation.quantity,
            unit_price,
        ))
    }
}
