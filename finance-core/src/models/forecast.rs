use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A projected month produced by the cost forecaster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub month: String,
    pub team_salary: Decimal,
    pub intern_stipend: Decimal,
    pub tasks: Decimal,
    pub total: Decimal,
    pub is_forecast: bool,
}

/// Fractions used to break a forecast total into cost components.
///
/// These are fixed business assumptions, not ratios learned from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSplit {
    pub team: Decimal,
    pub intern: Decimal,
    pub tasks: Decimal,
}

impl Default for ForecastSplit {
    fn default() -> Self {
        Self {
            team: Decimal::new(70, 2),
            intern: Decimal::new(10, 2),
            tasks: Decimal::new(20, 2),
        }
    }
}
