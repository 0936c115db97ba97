//! One-shot report combining every aggregation for a fiscal year.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::aggregate::{
    calculate_average_monthly_spending, calculate_ytd, find_inconsistent_records,
};
use crate::calculations::budget::budget_utilization;
use crate::calculations::common::round_half_up;
use crate::calculations::forecast::{CostForecaster, ForecastError};
use crate::calculations::tax::{calculate_progressive_tax, effective_tax_rate};
use crate::config::AggregatorConfig;
use crate::models::{Budget, BudgetStatus, ForecastRecord, MonthlyRecord, TaxBracket, YtdTotals};

/// Tax view of a single payroll figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollTax {
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    pub effective_rate: Decimal,
}

impl PayrollTax {
    pub fn compute(
        gross: Decimal,
        brackets: &[TaxBracket],
    ) -> Self {
        let tax = round_half_up(calculate_progressive_tax(gross, brackets));
        Self {
            gross,
            tax,
            net: gross - tax,
            effective_rate: effective_tax_rate(gross, brackets),
        }
    }
}

/// Utilization and tier of one budget line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetHealth {
    pub category: String,
    pub allocated: Decimal,
    pub spent: Decimal,
    pub utilization: Decimal,
    pub status: BudgetStatus,
}

/// Everything the dashboard shows for a year of monthly records.
///
/// A forecast that cannot be computed does not sink the whole summary; the
/// error is kept in `forecast` for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialSummary {
    pub months: usize,
    pub ytd: YtdTotals,
    pub average_monthly_spending: Decimal,
    pub forecast: Result<Vec<ForecastRecord>, ForecastError>,
    pub inconsistent_months: Vec<String>,
    pub payroll: Option<PayrollTax>,
    pub budgets: Vec<BudgetHealth>,
}

impl FinancialSummary {
    /// Builds the summary. `payroll_income` is taxed against `brackets` when
    /// given; `months_ahead` falls back to the configured horizon.
    pub fn build(
        records: &[MonthlyRecord],
        brackets: &[TaxBracket],
        budgets: &[Budget],
        payroll_income: Option<Decimal>,
        months_ahead: Option<usize>,
        config: &AggregatorConfig,
    ) -> Self {
        let horizon = months_ahead.unwrap_or(config.forecast_horizon);

        let budgets = budgets
            .iter()
            .map(|budget| {
                let utilization = budget_utilization(budget.spent, budget.allocated);
                BudgetHealth {
                    category: budget.category.clone(),
                    allocated: budget.allocated,
                    spent: budget.spent,
                    utilization: round_half_up(utilization),
                    status: config.budget_thresholds.classify(utilization),
                }
            })
            .collect();

        Self {
            months: records.len(),
            ytd: calculate_ytd(records),
            average_monthly_spending: round_half_up(calculate_average_monthly_spending(records)),
            forecast: CostForecaster::with_config(records, config).forecast(horizon),
            inconsistent_months: find_inconsistent_records(records)
                .into_iter()
                .map(|r| r.month.clone())
                .collect(),
            payroll: payroll_income.map(|gross| PayrollTax::compute(gross, brackets)),
            budgets,
        }
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Year to date ({} months)", self.months)?;
        writeln!(f, "  Team salary     : {}", self.ytd.team_salary)?;
        writeln!(f, "  Intern stipend  : {}", self.ytd.intern_stipend)?;
        writeln!(f, "  Tasks           : {}", self.ytd.tasks)?;
        writeln!(f, "  Total           : {}", self.ytd.total)?;
        writeln!(f, "  Monthly average : {}", self.average_monthly_spending)?;

        writeln!(f)?;
        match &self.forecast {
            Ok(rows) if rows.is_empty() => writeln!(f, "Forecast: not enough history")?,
            Ok(rows) => {
                writeln!(f, "Forecast")?;
                writeln!(
                    f,
                    "  {:<10} {:>12} {:>12} {:>12} {:>12}",
                    "Month", "Team", "Interns", "Tasks", "Total"
                )?;
                for row in rows {
                    writeln!(
                        f,
                        "  {:<10} {:>12} {:>12} {:>12} {:>12}",
                        row.month, row.team_salary, row.intern_stipend, row.tasks, row.total
                    )?;
                }
            }
            Err(e) => writeln!(f, "Forecast unavailable: {e}")?,
        }

        if let Some(payroll) = &self.payroll {
            writeln!(f)?;
            writeln!(f, "Payroll tax on {}", payroll.gross)?;
            writeln!(f, "  Tax            : {}", payroll.tax)?;
            writeln!(f, "  Net            : {}", payroll.net)?;
            writeln!(
                f,
                "  Effective rate : {}%",
                round_half_up(payroll.effective_rate * Decimal::ONE_HUNDRED)
            )?;
        }

        if !self.budgets.is_empty() {
            writeln!(f)?;
            writeln!(f, "Budgets")?;
            for line in &self.budgets {
                writeln!(
                    f,
                    "  {:<16} {:>12} / {:<12} {:>7}%  {} ({})",
                    line.category,
                    line.spent,
                    line.allocated,
                    line.utilization,
                    line.status,
                    line.status.color()
                )?;
            }
        }

        if !self.inconsistent_months.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Totals not matching components: {}",
                self.inconsistent_months.join(", ")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn records() -> Vec<MonthlyRecord> {
        vec![
            MonthlyRecord::from_components("Jan", dec!(70), dec!(10), dec!(20)),
            MonthlyRecord::from_components("Feb", dec!(77), dec!(11), dec!(22)),
        ]
    }

    fn brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(dec!(10000), Some(dec!(40000)), dec!(0.20)),
        ]
    }

    #[test]
    fn build_combines_all_aggregations() {
        let budgets = vec![
            Budget::new("Marketing", dec!(1000), dec!(950)),
            Budget::new("Hiring", dec!(2000), dec!(500)),
        ];

        let summary = FinancialSummary::build(
            &records(),
            &brackets(),
            &budgets,
            Some(dec!(25000)),
            Some(1),
            &AggregatorConfig::default(),
        );

        assert_eq!(summary.months, 2);
        assert_eq!(summary.ytd.total, dec!(210));
        assert_eq!(summary.average_monthly_spending, dec!(105));
        assert_eq!(summary.forecast.as_ref().unwrap()[0].total, dec!(121));
        assert_eq!(summary.payroll.as_ref().unwrap().tax, dec!(4000));
        assert_eq!(summary.payroll.as_ref().unwrap().net, dec!(21000));
        assert_eq!(summary.budgets[0].status, BudgetStatus::Critical);
        assert_eq!(summary.budgets[1].status, BudgetStatus::Healthy);
        assert_eq!(summary.budgets[1].utilization, dec!(25));
        assert!(summary.inconsistent_months.is_empty());
    }

    #[test]
    fn build_uses_configured_horizon_by_default() {
        let summary = FinancialSummary::build(
            &records(),
            &[],
            &[],
            None,
            None,
            &AggregatorConfig::default(),
        );

        assert_eq!(summary.forecast.unwrap().len(), 3);
        assert!(summary.payroll.is_none());
    }

    #[test]
    fn build_keeps_forecast_error() {
        let mut history = records();
        history[0].total = Decimal::ZERO;

        let summary = FinancialSummary::build(
            &history,
            &[],
            &[],
            None,
            None,
            &AggregatorConfig::default(),
        );

        assert!(matches!(summary.forecast, Err(ForecastError::ZeroBaseline { .. })));
        assert_eq!(summary.inconsistent_months, vec!["Jan".to_string()]);
    }

    #[test]
    fn display_lists_sections() {
        let summary = FinancialSummary::build(
            &records(),
            &brackets(),
            &[Budget::new("Ops", dec!(100), dec!(80))],
            Some(dec!(5000)),
            Some(2),
            &AggregatorConfig::default(),
        );

        let text = summary.to_string();

        assert!(text.contains("Year to date (2 months)"));
        assert!(text.contains("Month +2"));
        assert!(text.contains("Payroll tax on 5000"));
        assert!(text.contains("warning (yellow)"));
    }
}
