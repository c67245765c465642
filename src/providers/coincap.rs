//! CoinCap price provider.
//!
//! Current prices come from `/assets/{id}`, symbol lookups from
//! `/assets?search=` and historical points from `/assets/{id}/history`.

use crate::core::config::CoinCapProviderConfig;
use crate::core::{HistoricalPricePoint, PriceProvider, TokenDetails};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Search results are filtered for an exact symbol match on our side.
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct AssetResponse {
    data: Option<CoinCapAsset>,
}

#[derive(Debug, Deserialize)]
struct AssetListResponse {
    #[serde(default)]
    data: Vec<CoinCapAsset>,
}

#[derive(Debug, Deserialize)]
struct CoinCapAsset {
    id: String,
    symbol: String,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
}

impl CoinCapAsset {
    fn price(&self) -> Option<f64> {
        let raw = self.price_usd.as_deref()?;
        match raw.trim().parse::<f64>() {
            Ok(price) if price.is_finite() => Some(price),
            _ => {
                warn!("Failed to parse price for {}: {:?}", self.symbol, raw);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Vec<HistoricalPricePoint>,
}

pub struct CoinCapProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl CoinCapProvider {
    pub fn new(config: &CoinCapProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cryptowallet/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(CoinCapProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, identifier: &str) -> Result<T> {
        debug!("Requesting data from {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for {}", e, identifier))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for {}",
                response.status(),
                identifier
            ));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body for {identifier}"))?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse JSON response for {identifier}"))
    }
}

#[async_trait]
impl PriceProvider for CoinCapProvider {
    #[instrument(name = "CoinCapPriceFetch", skip(self))]
    async fn current_price(&self, provider_id: &str) -> Result<Option<f64>> {
        let url = format!("{}/assets/{}", self.base_url, provider_id.to_lowercase());
        let response: AssetResponse = self.get_json(&url, provider_id).await?;
        Ok(response.data.and_then(|asset| asset.price()))
    }

    #[instrument(name = "CoinCapSymbolSearch", skip(self))]
    async fn search_by_symbol(&self, symbol: &str) -> Option<TokenDetails> {
        let query = symbol.to_uppercase();
        let url = format!(
            "{}/assets?search={}&limit={}",
            self.base_url, query, SEARCH_LIMIT
        );

        let response: AssetListResponse = match self.get_json(&url, symbol).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching details for {}: {}", symbol, e);
                return None;
            }
        };

        let asset = response
            .data
            .into_iter()
            .find(|asset| asset.symbol.eq_ignore_ascii_case(&query))?;
        let price = asset.price()?;
        Some(TokenDetails {
            provider_id: asset.id,
            symbol: asset.symbol,
            price,
        })
    }

    #[instrument(name = "CoinCapHistoryFetch", skip(self))]
    async fn historical_price(
        &self,
        provider_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<HistoricalPricePoint>> {
        let url = format!(
            "{}/assets/{}/history?interval=m1&start={}&end={}",
            self.base_url,
            provider_id.to_lowercase(),
            start.timestamp_millis(),
            end.timestamp_millis()
        );
        let response: HistoryResponse = self.get_json(&url, provider_id).await?;
        Ok(response.data.into_iter().next())
    }
}
