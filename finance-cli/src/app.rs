use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use finance_core::calculations::FinancialSummary;
use finance_core::db::{InMemoryRepositoryFactory, RepositoryRegistry};
use finance_core::{Budget, FinanceRepository, MonthlyRecord, TaxBracket};
use finance_data::MonthlyRecordLoader;
use finance_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info, warn};

use crate::settings::{ReportSettings, Settings};

/// Registry with every backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(InMemoryRepositoryFactory));
    registry
}

/// Everything a report needs, gathered before any aggregation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInputs {
    pub fiscal_year: i32,
    pub records: Vec<MonthlyRecord>,
    pub brackets: Vec<TaxBracket>,
    pub budgets: Vec<Budget>,
}

/// Gathers report inputs.
///
/// Monthly records come from the CSV file when one is configured, from the
/// store otherwise. Tax brackets and budgets always come from the store.
///
/// Without an explicit year the newest year available is used, falling back
/// to the current calendar year when there is nothing at all.
pub async fn load_report_inputs(
    repo: &dyn FinanceRepository,
    report: &ReportSettings,
) -> Result<ReportInputs> {
    let (fiscal_year, records) = match &report.csv {
        Some(path) => records_from_csv(path, report.year)?,
        None => {
            let fiscal_year = match report.year {
                Some(year) => year,
                None => repo
                    .list_fiscal_years()
                    .await
                    .context("Failed to list fiscal years")?
                    .first()
                    .copied()
                    .unwrap_or_else(|| Local::now().year()),
            };
            let records = repo
                .load_monthly_records(fiscal_year)
                .await
                .with_context(|| format!("Failed to load monthly records for {fiscal_year}"))?;
            (fiscal_year, records)
        }
    };
    debug!(fiscal_year, months = records.len(), "monthly records loaded");

    let brackets = repo
        .load_tax_brackets(&report.schedule)
        .await
        .with_context(|| format!("Failed to load tax schedule '{}'", report.schedule))?;
    if brackets.is_empty() && report.income.is_some() {
        warn!(schedule = %report.schedule, "tax schedule has no brackets; tax will be zero");
    }

    let budgets = repo
        .load_budgets(fiscal_year)
        .await
        .with_context(|| format!("Failed to load budgets for {fiscal_year}"))?;

    Ok(ReportInputs {
        fiscal_year,
        records,
        brackets,
        budgets,
    })
}

fn records_from_csv(
    path: &Path,
    year: Option<i32>,
) -> Result<(i32, Vec<MonthlyRecord>)> {
    let file =
        File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let rows = MonthlyRecordLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

    let fiscal_year = match year.or_else(|| rows.iter().map(|row| row.fiscal_year).max()) {
        Some(year) => year,
        None => anyhow::bail!("{} contains no monthly records", path.display()),
    };
    info!(path = %path.display(), fiscal_year, "reading monthly records from CSV");

    Ok((fiscal_year, MonthlyRecordLoader::records_for_year(&rows, fiscal_year)))
}

/// Runs the aggregator and logs anything the reader should double-check.
pub fn summarize(
    inputs: &ReportInputs,
    settings: &Settings,
) -> FinancialSummary {
    let summary = FinancialSummary::build(
        &inputs.records,
        &inputs.brackets,
        &inputs.budgets,
        settings.report.income,
        settings.report.months,
        &settings.aggregator,
    );

    if !summary.inconsistent_months.is_empty() {
        warn!(
            months = ?summary.inconsistent_months,
            "stored totals do not match their components"
        );
    }
    if let Err(error) = &summary.forecast {
        warn!(%error, "forecast unavailable");
    }

    summary
}
