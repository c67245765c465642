//! Scriptable in-process price provider for engine tests.

use crate::core::{HistoricalPricePoint, PriceProvider, TokenDetails};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Price(f64),
    Empty,
    Fail,
}

#[derive(Debug, Clone)]
enum History {
    Point(String),
    Fail,
}

#[derive(Default)]
pub(crate) struct FakeProvider {
    current: Mutex<HashMap<String, VecDeque<Reply>>>,
    history: HashMap<String, History>,
    tokens: HashMap<String, TokenDetails>,
    delay: Option<Duration>,
    current_calls: Mutex<HashMap<String, usize>>,
    history_calls: AtomicUsize,
    search_calls: AtomicUsize,
    windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replies returned by successive `current_price` calls. The last reply
    /// repeats once the script runs out.
    pub(crate) fn with_current(self, id: &str, replies: &[Reply]) -> Self {
        self.current
            .lock()
            .unwrap()
            .insert(id.to_string(), replies.iter().copied().collect());
        self
    }

    pub(crate) fn with_history(mut self, id: &str, price_usd: &str) -> Self {
        self.history
            .insert(id.to_string(), History::Point(price_usd.to_string()));
        self
    }

    pub(crate) fn with_history_error(mut self, id: &str) -> Self {
        self.history.insert(id.to_string(), History::Fail);
        self
    }

    pub(crate) fn with_token(mut self, id: &str, symbol: &str, price: f64) -> Self {
        self.tokens.insert(
            symbol.to_uppercase(),
            TokenDetails {
                provider_id: id.to_string(),
                symbol: symbol.to_string(),
                price,
            },
        );
        self
    }

    /// Delays every provider call, to keep tasks in flight.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn current_calls(&self, id: &str) -> usize {
        self.current_calls
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_current_calls(&self) -> usize {
        self.current_calls.lock().unwrap().values().sum()
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn windows(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.windows.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PriceProvider for FakeProvider {
    async fn current_price(&self, provider_id: &str) -> Result<Option<f64>> {
        *self
            .current_calls
            .lock()
            .unwrap()
            .entry(provider_id.to_string())
            .or_default() += 1;
        self.pause().await;

        let reply = {
            let mut scripts = self.current.lock().unwrap();
            match scripts.get_mut(provider_id) {
                Some(script) if script.len() > 1 => script.pop_front(),
                Some(script) => script.front().copied(),
                None => None,
            }
        };
        match reply {
            Some(Reply::Price(price)) => Ok(Some(price)),
            Some(Reply::Empty) | None => Ok(None),
            Some(Reply::Fail) => Err(anyhow!("HTTP error: 503 for {provider_id}")),
        }
    }

    async fn search_by_symbol(&self, symbol: &str) -> Option<TokenDetails> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.tokens.get(&symbol.to_uppercase()).cloned()
    }

    async fn historical_price(
        &self,
        provider_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<HistoricalPricePoint>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push((start, end));
        self.pause().await;

        match self.history.get(provider_id) {
            Some(History::Point(price_usd)) => Ok(Some(HistoricalPricePoint {
                price_usd: price_usd.clone(),
                timestamp_millis: start.timestamp_millis(),
            })),
            Some(History::Fail) => Err(anyhow!("Client error fetching history for {provider_id}")),
            None => Ok(None),
        }
    }
}
