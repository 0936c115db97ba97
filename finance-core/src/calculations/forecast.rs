//! Cost forecasting from recent monthly history.
//!
//! The forecaster learns an average month-over-month relative growth rate from
//! a trailing window of records and compounds it forward from the most recent
//! total:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Fewer than two records: no forecast |
//! | 2    | Trend window = the last `min(trend_window, len)` records |
//! | 3    | Growth per pair = `(curr.total - prev.total) / prev.total`, averaged |
//! | 4    | Horizon `i` total = `last.total × (1 + growth)^i` |
//! | 5    | Components = total × [`ForecastSplit`], each rounded independently |
//! | 6    | Labelled `"Month +i"` and flagged `is_forecast` |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::MonthlyRecord;
//! use finance_core::calculations::CostForecaster;
//!
//! let history = vec![
//!     MonthlyRecord::from_components("Jan", dec!(70), dec!(10), dec!(20)),
//!     MonthlyRecord::from_components("Feb", dec!(77), dec!(11), dec!(22)),
//! ];
//!
//! let forecast = CostForecaster::new(&history).forecast(2).unwrap();
//!
//! assert_eq!(forecast[0].month, "Month +1");
//! assert_eq!(forecast[0].total, dec!(121));
//! assert_eq!(forecast[1].total, dec!(133));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{divide_or_zero, round_whole};
use crate::config::{AggregatorConfig, DEFAULT_TREND_WINDOW};
use crate::models::{ForecastRecord, ForecastSplit, MonthlyRecord};

/// Fewest records from which a growth trend can be learned.
const MIN_HISTORY: usize = 2;

/// Errors that can occur while projecting costs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForecastError {
    /// A record inside the trend window has a zero total, so the relative
    /// growth from it is undefined.
    #[error("cannot compute growth from month '{month}': total is zero")]
    ZeroBaseline { month: String },

    /// Growth into this month is outside the decimal range.
    #[error("growth into month '{month}' is out of range")]
    GrowthOutOfRange { month: String },

    /// Compounding overflowed the decimal range.
    #[error("forecast overflowed at horizon {horizon}")]
    Overflow { horizon: usize },
}

/// Projects future monthly costs from a borrowed slice of history.
#[derive(Debug, Clone)]
pub struct CostForecaster<'a> {
    records: &'a [MonthlyRecord],
    split: ForecastSplit,
    trend_window: usize,
    strict_mode: bool,
}

impl<'a> CostForecaster<'a> {
    /// Creates a forecaster with the stock window, split and parity mode.
    pub fn new(records: &'a [MonthlyRecord]) -> Self {
        Self {
            records,
            split: ForecastSplit::default(),
            trend_window: DEFAULT_TREND_WINDOW,
            strict_mode: false,
        }
    }

    /// Creates a forecaster that takes its window, split and strictness from
    /// `config`.
    pub fn with_config(
        records: &'a [MonthlyRecord],
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            records,
            split: config.forecast_split,
            trend_window: config.trend_window,
            strict_mode: config.strict_mode,
        }
    }

    pub fn split(
        mut self,
        split: ForecastSplit,
    ) -> Self {
        self.split = split;
        self
    }

    pub fn strict(
        mut self,
        strict_mode: bool,
    ) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Projects `months_ahead` months past the last record.
    ///
    /// Returns an empty vector when there are fewer than two records or when
    /// `months_ahead` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if:
    /// - A zero total sits inside the trend window and strict mode is off
    /// - A growth ratio, compounding or the component split exceeds the
    ///   decimal range
    pub fn forecast(
        &self,
        months_ahead: usize,
    ) -> Result<Vec<ForecastRecord>, ForecastError> {
        let Some(last) = self.records.last() else {
            return Ok(Vec::new());
        };
        if self.records.len() < MIN_HISTORY || months_ahead == 0 {
            return Ok(Vec::new());
        }

        let growth_rate = self.average_growth_rate()?;
        let step = Decimal::ONE
            .checked_add(growth_rate)
            .ok_or_else(|| ForecastError::GrowthOutOfRange {
                month: last.month.clone(),
            })?;
        debug!(%growth_rate, base = %last.total, months_ahead, "projecting costs");

        let mut factor = Decimal::ONE;
        let mut projections = Vec::with_capacity(months_ahead);
        for horizon in 1..=months_ahead {
            factor = factor
                .checked_mul(step)
                .ok_or(ForecastError::Overflow { horizon })?;
            let projected = last
                .total
                .checked_mul(factor)
                .ok_or(ForecastError::Overflow { horizon })?;
            projections.push(self.project(horizon, projected)?);
        }

        Ok(projections)
    }

    /// The trailing records used to learn the trend.
    fn trend_window(&self) -> &'a [MonthlyRecord] {
        let size = self
            .trend_window
            .max(MIN_HISTORY)
            .min(self.records.len());
        &self.records[self.records.len() - size..]
    }

    /// Average relative growth between consecutive records in the window.
    fn average_growth_rate(&self) -> Result<Decimal, ForecastError> {
        let mut sum = Decimal::ZERO;
        let mut pairs = 0usize;

        for pair in self.trend_window().windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.total.is_zero() {
                if self.strict_mode {
                    warn!(month = %prev.month, "skipping zero baseline in growth trend");
                    continue;
                }
                return Err(ForecastError::ZeroBaseline {
                    month: prev.month.clone(),
                });
            }
            let out_of_range = || ForecastError::GrowthOutOfRange {
                month: curr.month.clone(),
            };
            let growth = curr
                .total
                .checked_sub(prev.total)
                .and_then(|delta| delta.checked_div(prev.total))
                .ok_or_else(out_of_range)?;
            sum = sum.checked_add(growth).ok_or_else(out_of_range)?;
            pairs += 1;
        }

        Ok(divide_or_zero(sum, Decimal::from(pairs)))
    }

    /// Splits a projected total into rounded components.
    fn project(
        &self,
        horizon: usize,
        projected: Decimal,
    ) -> Result<ForecastRecord, ForecastError> {
        let share = |fraction: Decimal| {
            projected
                .checked_mul(fraction)
                .map(round_whole)
                .ok_or(ForecastError::Overflow { horizon })
        };

        Ok(ForecastRecord {
            month: format!("Month +{horizon}"),
            team_salary: share(self.split.team)?,
            intern_stipend: share(self.split.intern)?,
            tasks: share(self.split.tasks)?,
            total: round_whole(projected),
            is_forecast: true,
        })
    }
}

/// Forecasts with the stock configuration. See [`CostForecaster`].
pub fn forecast_costs(
    records: &[MonthlyRecord],
    months_ahead: usize,
) -> Result<Vec<ForecastRecord>, ForecastError> {
    CostForecaster::new(records).forecast(months_ahead)
}
