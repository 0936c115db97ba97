//! Process-local [`FinanceRepository`] backed by hash maps.
//!
//! State lives only as long as the repository value. Useful for tests and for
//! running a report straight from CSV without touching disk.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{FinanceRepository, RepositoryError};
use crate::models::{Budget, MonthlyRecord, TaxBracket};

#[derive(Debug, Default)]
struct State {
    monthly: HashMap<i32, (Vec<MonthlyRecord>, DateTime<Utc>)>,
    brackets: HashMap<String, Vec<TaxBracket>>,
    budgets: HashMap<i32, Vec<Budget>>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.state
            .read()
            .map_err(|_| RepositoryError::Database("state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state
            .write()
            .map_err(|_| RepositoryError::Database("state lock poisoned".to_string()))
    }
}

#[async_trait]
impl FinanceRepository for InMemoryRepository {
    async fn list_fiscal_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let mut years: Vec<i32> = self.read()?.monthly.keys().copied().collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }

    async fn load_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<MonthlyRecord>, RepositoryError> {
        Ok(self
            .read()?
            .monthly
            .get(&fiscal_year)
            .map(|(records, _)| records.clone())
            .unwrap_or_default())
    }

    async fn save_monthly_records(
        &self,
        fiscal_year: i32,
        records: &[MonthlyRecord],
    ) -> Result<usize, RepositoryError> {
        self.write()?
            .monthly
            .insert(fiscal_year, (records.to_vec(), Utc::now()));
        Ok(records.len())
    }

    async fn delete_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<(), RepositoryError> {
        self.write()?
            .monthly
            .remove(&fiscal_year)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn last_saved_at(
        &self,
        fiscal_year: i32,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        self.read()?
            .monthly
            .get(&fiscal_year)
            .map(|(_, saved_at)| *saved_at)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_tax_schedules(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = self.read()?.brackets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn load_tax_brackets(
        &self,
        schedule: &str,
    ) -> Result<Vec<TaxBracket>, RepositoryError> {
        let mut brackets = self
            .read()?
            .brackets
            .get(schedule)
            .cloned()
            .unwrap_or_default();
        brackets.sort_by(|a, b| a.min.cmp(&b.min));
        Ok(brackets)
    }

    async fn save_tax_brackets(
        &self,
        schedule: &str,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError> {
        self.write()?
            .brackets
            .insert(schedule.to_string(), brackets.to_vec());
        Ok(brackets.len())
    }

    async fn load_budgets(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<Budget>, RepositoryError> {
        let mut budgets = self
            .read()?
            .budgets
            .get(&fiscal_year)
            .cloned()
            .unwrap_or_default();
        budgets.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(budgets)
    }

    async fn save_budgets(
        &self,
        fiscal_year: i32,
        budgets: &[Budget],
    ) -> Result<usize, RepositoryError> {
        // Category is unique within a year; a rejected save keeps the old set.
        let mut seen = HashSet::new();
        if let Some(dup) = budgets.iter().find(|b| !seen.insert(b.category.as_str())) {
            return Err(RepositoryError::Database(format!(
                "duplicate budget category '{}' for {fiscal_year}",
                dup.category
            )));
        }

        self.write()?.budgets.insert(fiscal_year, budgets.to_vec());
        Ok(budgets.len())
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. The connection string is
/// ignored.
pub struct InMemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for InMemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
        Ok(Box::new(InMemoryRepository::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn january() -> MonthlyRecord {
        MonthlyRecord::from_components("Jan", dec!(45000), dec!(6000), dec!(12000))
    }

    #[tokio::test]
    async fn save_then_load_monthly_records() {
        let repo = InMemoryRepository::new();

        let saved = repo.save_monthly_records(2024, &[january()]).await.unwrap();
        let loaded = repo.load_monthly_records(2024).await.unwrap();

        assert_eq!(saved, 1);
        assert_eq!(loaded, vec![january()]);
    }

    #[tokio::test]
    async fn save_replaces_previous_year() {
        let repo = InMemoryRepository::new();
        repo.save_monthly_records(2024, &[january(), january()])
            .await
            .unwrap();

        repo.save_monthly_records(2024, &[january()]).await.unwrap();

        assert_eq!(repo.load_monthly_records(2024).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_year_loads_empty_and_has_no_timestamp() {
        let repo = InMemoryRepository::new();

        assert!(repo.load_monthly_records(1999).await.unwrap().is_empty());
        assert_eq!(
            repo.last_saved_at(1999).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_year_is_not_found() {
        let repo = InMemoryRepository::new();

        assert_eq!(
            repo.delete_monthly_records(2024).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn fiscal_years_are_newest_first() {
        let repo = InMemoryRepository::new();
        repo.save_monthly_records(2023, &[january()]).await.unwrap();
        repo.save_monthly_records(2025, &[january()]).await.unwrap();
        repo.save_monthly_records(2024, &[january()]).await.unwrap();

        assert_eq!(repo.list_fiscal_years().await.unwrap(), vec![2025, 2024, 2023]);
    }

    #[tokio::test]
    async fn tax_brackets_load_sorted_by_min() {
        let repo = InMemoryRepository::new();
        let brackets = vec![
            TaxBracket::new(dec!(10000), None, dec!(0.20)),
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
        ];

        repo.save_tax_brackets("standard", &brackets).await.unwrap();
        let loaded = repo.load_tax_brackets("standard").await.unwrap();

        assert_eq!(loaded[0].min, dec!(0));
        assert_eq!(loaded[1].min, dec!(10000));
        assert_eq!(repo.list_tax_schedules().await.unwrap(), vec!["standard"]);
    }

    #[tokio::test]
    async fn budgets_round_trip() {
        let repo = InMemoryRepository::new();
        let budgets = vec![Budget::new("Marketing", dec!(5000), dec!(4200))];

        repo.save_budgets(2024, &budgets).await.unwrap();

        assert_eq!(repo.load_budgets(2024).await.unwrap(), budgets);
        assert!(repo.load_budgets(2025).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn budgets_load_sorted_by_category() {
        let repo = InMemoryRepository::new();
        let budgets = vec![
            Budget::new("Operations", dec!(50), dec!(10)),
            Budget::new("Engineering", dec!(90), dec!(80)),
        ];

        repo.save_budgets(2024, &budgets).await.unwrap();

        let categories: Vec<String> = repo
            .load_budgets(2024)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.category)
            .collect();
        assert_eq!(categories, vec!["Engineering", "Operations"]);
    }

    #[tokio::test]
    async fn duplicate_budget_category_is_rejected() {
        let repo = InMemoryRepository::new();
        let original = vec![Budget::new("Ops", dec!(10), dec!(5))];
        repo.save_budgets(2024, &original).await.unwrap();

        let result = repo
            .save_budgets(
                2024,
                &[
                    Budget::new("Ops", dec!(1), dec!(1)),
                    Budget::new("Ops", dec!(2), dec!(2)),
                ],
            )
            .await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert_eq!(repo.load_budgets(2024).await.unwrap(), original);
    }
}
