//! Financial aggregation over monthly cost records.
//!
//! Everything in here is a pure function of its arguments: no I/O, no caching
//! and no shared state. Inputs are borrowed and never mutated.

pub mod aggregate;
pub mod budget;
pub mod common;
pub mod forecast;
pub mod summary;
pub mod tax;

pub use aggregate::{calculate_average_monthly_spending, calculate_ytd, find_inconsistent_records};
pub use budget::{budget_utilization, get_budget_status};
pub use forecast::{CostForecaster, ForecastError, forecast_costs};
pub use summary::{BudgetHealth, FinancialSummary, PayrollTax};
pub use tax::{calculate_progressive_tax, effective_tax_rate, net_pay};
