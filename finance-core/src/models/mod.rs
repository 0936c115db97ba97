mod budget;
mod forecast;
mod monthly_record;
mod tax_bracket;

pub use budget::{Budget, BudgetClassification, BudgetStatus};
pub use forecast::{ForecastRecord, ForecastSplit};
pub use monthly_record::{MonthlyRecord, YtdTotals};
pub use tax_bracket::TaxBracket;
