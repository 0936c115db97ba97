use std::collections::BTreeMap;
use std::io::Read;

use finance_core::{Budget, FinanceRepository, MonthlyRecord, RepositoryError, TaxBracket};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading CSV data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: month label is empty")]
    EmptyMonth { row: usize },

    #[error("Row {row}: {column} is empty")]
    EmptyName { row: usize, column: &'static str },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reads every row of a headed CSV into `T`. Whitespace around cells is
/// ignored and column order does not matter.
fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Monthly records
// ---------------------------------------------------------------------------

/// A single row of the monthly cost CSV.
///
/// | Column           | Required | Notes                                   |
/// |------------------|----------|-----------------------------------------|
/// | `fiscal_year`    | yes      | e.g. `2024`                             |
/// | `month`          | yes      | free-form label, e.g. `Jan`             |
/// | `team_salary`    | yes      | decimal                                 |
/// | `intern_stipend` | yes      | decimal                                 |
/// | `tasks`          | yes      | decimal                                 |
/// | `total`          | no       | empty or missing: sum of the components |
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonthlyRecordRow {
    pub fiscal_year: i32,
    pub month: String,
    pub team_salary: Decimal,
    pub intern_stipend: Decimal,
    pub tasks: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub total: Option<Decimal>,
}

impl MonthlyRecordRow {
    /// Converts the row, keeping a given total even when it disagrees with
    /// the components.
    pub fn to_record(&self) -> MonthlyRecord {
        let mut record = MonthlyRecord::from_components(
            self.month.clone(),
            self.team_salary,
            self.intern_stipend,
            self.tasks,
        );
        if let Some(total) = self.total {
            record.total = total;
        }
        record
    }
}

pub struct MonthlyRecordLoader;

impl MonthlyRecordLoader {
    /// Parse monthly cost rows from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<MonthlyRecordRow>, LoaderError> {
        let rows: Vec<MonthlyRecordRow> = read_rows(reader)?;
        for (i, row) in rows.iter().enumerate() {
            if row.month.trim().is_empty() {
                return Err(LoaderError::EmptyMonth { row: i + 1 });
            }
        }
        Ok(rows)
    }

    /// Records of one fiscal year, in file order.
    pub fn records_for_year(
        rows: &[MonthlyRecordRow],
        fiscal_year: i32,
    ) -> Vec<MonthlyRecord> {
        rows.iter()
            .filter(|row| row.fiscal_year == fiscal_year)
            .map(MonthlyRecordRow::to_record)
            .collect()
    }

    /// Save the rows, one replacement per fiscal year present in `rows`.
    ///
    /// Years not mentioned in the file are left alone. Returns the number of
    /// records stored.
    pub async fn load<R: FinanceRepository + ?Sized>(
        repo: &R,
        rows: &[MonthlyRecordRow],
    ) -> Result<usize, LoaderError> {
        let mut years: BTreeMap<i32, Vec<MonthlyRecord>> = BTreeMap::new();
        for row in rows {
            years.entry(row.fiscal_year).or_default().push(row.to_record());
        }

        let mut stored = 0;
        for (fiscal_year, records) in years {
            stored += repo.save_monthly_records(fiscal_year, &records).await?;
            debug!(fiscal_year, count = records.len(), "loaded monthly records");
        }
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Tax brackets
// ---------------------------------------------------------------------------

/// A single row of the tax bracket CSV: `schedule, min, max, rate`.
/// An empty `max` marks the open-ended top bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRow {
    pub schedule: String,
    pub min: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracketRow {
    pub fn to_bracket(&self) -> TaxBracket {
        TaxBracket::new(self.min, self.max, self.rate)
    }
}

pub struct TaxBracketLoader;

impl TaxBracketLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRow>, LoaderError> {
        let rows: Vec<TaxBracketRow> = read_rows(reader)?;
        for (i, row) in rows.iter().enumerate() {
            if row.schedule.trim().is_empty() {
                return Err(LoaderError::EmptyName {
                    row: i + 1,
                    column: "schedule",
                });
            }
        }
        Ok(rows)
    }

    /// Brackets of one schedule, in file order.
    pub fn brackets_for_schedule(
        rows: &[TaxBracketRow],
        schedule: &str,
    ) -> Vec<TaxBracket> {
        rows.iter()
            .filter(|row| row.schedule == schedule)
            .map(TaxBracketRow::to_bracket)
            .collect()
    }

    /// Save the rows, one replacement per schedule present in `rows`.
    pub async fn load<R: FinanceRepository + ?Sized>(
        repo: &R,
        rows: &[TaxBracketRow],
    ) -> Result<usize, LoaderError> {
        let mut schedules: BTreeMap<&str, Vec<TaxBracket>> = BTreeMap::new();
        for row in rows {
            schedules
                .entry(row.schedule.as_str())
                .or_default()
                .push(row.to_bracket());
        }

        let mut stored = 0;
        for (schedule, brackets) in schedules {
            stored += repo.save_tax_brackets(schedule, &brackets).await?;
        }
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

/// A single row of the budget CSV: `fiscal_year, category, allocated, spent`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BudgetRow {
    pub fiscal_year: i32,
    pub category: String,
    pub allocated: Decimal,
    pub spent: Decimal,
}

impl BudgetRow {
    pub fn to_budget(&self) -> Budget {
        Budget::new(self.category.clone(), self.allocated, self.spent)
    }
}

pub struct BudgetLoader;

impl BudgetLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BudgetRow>, LoaderError> {
        let rows: Vec<BudgetRow> = read_rows(reader)?;
        for (i, row) in rows.iter().enumerate() {
            if row.category.trim().is_empty() {
                return Err(LoaderError::EmptyName {
                    row: i + 1,
                    column: "category",
                });
            }
        }
        Ok(rows)
    }

    pub fn budgets_for_year(
        rows: &[BudgetRow],
        fiscal_year: i32,
    ) -> Vec<Budget> {
        rows.iter()
            .filter(|row| row.fiscal_year == fiscal_year)
            .map(BudgetRow::to_budget)
            .collect()
    }

    /// Save the rows, one replacement per fiscal year present in `rows`.
    pub async fn load<R: FinanceRepository + ?Sized>(
        repo: &R,
        rows: &[BudgetRow],
    ) -> Result<usize, LoaderError> {
        let mut years: BTreeMap<i32, Vec<Budget>> = BTreeMap::new();
        for row in rows {
            years.entry(row.fiscal_year).or_default().push(row.to_budget());
        }

        let mut stored = 0;
        for (fiscal_year, budgets) in years {
            stored += repo.save_budgets(fiscal_year, &budgets).await?;
        }
        Ok(stored)
    }
}
