use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Costs booked for a single month.
///
/// `total` is expected to equal the sum of the three components, but nothing
/// enforces it; aggregations trust `total` as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month: String,
    pub team_salary: Decimal,
    pub intern_stipend: Decimal,
    pub tasks: Decimal,
    pub total: Decimal,
}

impl MonthlyRecord {
    /// Builds a record whose `total` is the sum of its components.
    pub fn from_components(
        month: impl Into<String>,
        team_salary: Decimal,
        intern_stipend: Decimal,
        tasks: Decimal,
    ) -> Self {
        Self {
            month: month.into(),
            team_salary,
            intern_stipend,
            tasks,
            total: team_salary + intern_stipend + tasks,
        }
    }

    pub fn component_sum(&self) -> Decimal {
        self.team_salary + self.intern_stipend + self.tasks
    }

    /// Returns true when `total` matches the component sum.
    pub fn is_consistent(&self) -> bool {
        self.total == self.component_sum()
    }
}

/// Year-to-date sums of every [`MonthlyRecord`] field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdTotals {
    pub team_salary: Decimal,
    pub intern_stipend: Decimal,
    pub tasks: Decimal,
    pub total: Decimal,
}
