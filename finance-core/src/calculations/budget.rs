//! Budget utilization and health classification.

use rust_decimal::Decimal;

use crate::config::BudgetThresholds;
use crate::models::BudgetStatus;

/// Classifies a utilization percentage with the stock 70/90 thresholds.
///
/// No clamping is applied: 150 is critical and -5 is healthy.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::BudgetStatus;
/// use finance_core::calculations::get_budget_status;
///
/// assert_eq!(get_budget_status(dec!(69.9)), BudgetStatus::Healthy);
/// assert_eq!(get_budget_status(dec!(70)), BudgetStatus::Warning);
/// assert_eq!(get_budget_status(dec!(90)), BudgetStatus::Critical);
/// ```
pub fn get_budget_status(utilization_percentage: Decimal) -> BudgetStatus {
    BudgetThresholds::default().classify(utilization_percentage)
}

impl BudgetThresholds {
    pub fn classify(
        &self,
        utilization_percentage: Decimal,
    ) -> BudgetStatus {
        if utilization_percentage < self.warning {
            BudgetStatus::Healthy
        } else if utilization_percentage < self.critical {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Critical
        }
    }
}

/// `spent` as a percentage of `allocated`; zero when nothing was allocated.
///
/// A percentage beyond the decimal range saturates at `Decimal::MAX` (or
/// `Decimal::MIN` when the signs differ).
pub fn budget_utilization(
    spent: Decimal,
    allocated: Decimal,
) -> Decimal {
    if allocated.is_zero() {
        return Decimal::ZERO;
    }
    spent
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(allocated))
        .unwrap_or(if spent.is_sign_negative() == allocated.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}
