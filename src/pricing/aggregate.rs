//! Shared accumulator of one historical evaluation.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a successful evaluation. Performances are percentages rounded
/// half away from zero to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEvaluation {
    pub total: f64,
    pub best_asset: String,
    pub best_performance: f64,
    pub worst_asset: String,
    pub worst_performance: f64,
}

/// Running total plus best and worst performer.
///
/// Folds are commutative except for exact ties, where the incumbent is kept:
/// under concurrent writers whichever equal performance lands first wins.
#[derive(Debug, Clone)]
pub struct EvaluationAggregate {
    total_value: f64,
    best_symbol: Option<String>,
    best_performance: f64,
    worst_symbol: Option<String>,
    worst_performance: f64,
}

impl Default for EvaluationAggregate {
    fn default() -> Self {
        EvaluationAggregate {
            total_value: 0.0,
            best_symbol: None,
            best_performance: f64::NEG_INFINITY,
            worst_symbol: None,
            worst_performance: f64::INFINITY,
        }
    }
}

impl EvaluationAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one asset's past price into the aggregate.
    ///
    /// The total always grows by `quantity * past_price`. Only a positive past
    /// price takes part in best/worst selection.
    pub fn record(&mut self, symbol: &str, quantity: f64, current_unit_price: f64, past_price: f64) {
        self.total_value += quantity * past_price;

        if past_price <= 0.0 {
            return;
        }

        let performance = (current_unit_price - past_price) / past_price * 100.0;
        if performance > self.best_performance {
            self.best_performance = performance;
            self.best_symbol = Some(symbol.to_string());
        }
        if performance < self.worst_performance {
            self.worst_performance = performance;
            self.worst_symbol = Some(symbol.to_string());
        }
    }

    /// `None` when no asset ever set a best performance.
    pub fn finalize(self) -> Option<WalletEvaluation> {
        if self.best_performance == f64::NEG_INFINITY {
            return None;
        }
        Some(WalletEvaluation {
            total: self.total_value,
            best_asset: self.best_symbol?,
            best_performance: round_half_up(self.best_performance, 2),
            worst_asset: self.worst_symbol?,
            worst_performance: round_half_up(self.worst_performance, 2),
        })
    }
}

/// Rounds half away from zero. The shortest decimal form of `value` is rounded,
/// so `10.005` becomes `10.01` even though its binary value sits just below.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    Decimal::from_str(&value.to_string())
        .ok()
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
