//! Tunable knobs for the financial aggregator.
//!
//! Every field has a default, so an empty `[aggregator]` table (or no table at
//! all) yields the stock behaviour.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ForecastSplit;

/// Number of trailing months used to learn the growth trend.
pub const DEFAULT_TREND_WINDOW: usize = 6;

/// Months projected when the caller does not ask for a specific horizon.
pub const DEFAULT_FORECAST_HORIZON: usize = 3;

/// Utilization percentages at which a budget changes tier.
///
/// A value equal to a threshold belongs to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetThresholds {
    pub warning: Decimal,
    pub critical: Decimal,
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            warning: Decimal::from(70),
            critical: Decimal::from(90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Guard every division. When false, a zero total inside the trend
    /// window is reported as an error instead of being skipped.
    pub strict_mode: bool,

    /// Trailing months considered by the forecaster. Values below 2 are
    /// treated as 2.
    pub trend_window: usize,

    /// Default number of months to forecast.
    pub forecast_horizon: usize,

    pub forecast_split: ForecastSplit,

    pub budget_thresholds: BudgetThresholds,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            trend_window: DEFAULT_TREND_WINDOW,
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            forecast_split: ForecastSplit::default(),
            budget_thresholds: BudgetThresholds::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Default::default()
        }
    }
}
