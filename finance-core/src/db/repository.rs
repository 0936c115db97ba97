use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Budget, MonthlyRecord, TaxBracket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persisted dashboard state.
///
/// Callers hold a repository explicitly and decide when to load and save;
/// every `save_*` replaces the stored set for its key in one step.
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    // Monthly cost records
    async fn list_fiscal_years(&self) -> Result<Vec<i32>, RepositoryError>;

    /// Records for `fiscal_year` in the order they were saved.
    async fn load_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<MonthlyRecord>, RepositoryError>;

    async fn save_monthly_records(
        &self,
        fiscal_year: i32,
        records: &[MonthlyRecord],
    ) -> Result<usize, RepositoryError>;

    async fn delete_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<(), RepositoryError>;

    async fn last_saved_at(
        &self,
        fiscal_year: i32,
    ) -> Result<DateTime<Utc>, RepositoryError>;

    // Tax brackets
    async fn list_tax_schedules(&self) -> Result<Vec<String>, RepositoryError>;

    /// Brackets of `schedule` ordered by their lower bound.
    async fn load_tax_brackets(
        &self,
        schedule: &str,
    ) -> Result<Vec<TaxBracket>, RepositoryError>;

    async fn save_tax_brackets(
        &self,
        schedule: &str,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError>;

    // Budgets
    async fn load_budgets(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<Budget>, RepositoryError>;

    async fn save_budgets(
        &self,
        fiscal_year: i32,
        budgets: &[Budget],
    ) -> Result<usize, RepositoryError>;
}
