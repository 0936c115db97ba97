use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use finance_core::db::{DbConfig, RepositoryFactory};
use finance_core::{FinanceRepository, RepositoryError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`FINANCE_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** as last resort (dev/tests).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FINANCE_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`finance_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use finance_core::db::RepositoryRegistry;
/// use finance_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"finance.db"`. The file is created if it
    ///   does not exist.
    /// * A sqlx URL, e.g. `"sqlite:finance.db"`.
    /// * `":memory:"`, an ephemeral in-memory database. The pool is held to a
    ///   single connection so every query sees the same database.
    ///
    /// Migrations always run. Seed files run when the resolved seeds
    /// directory exists.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
        let in_memory = config.connection_string == ":memory:";
        let url = if in_memory {
            "sqlite::memory:".to_string()
        } else if config.connection_string.starts_with("sqlite:") {
            config.connection_string.clone()
        } else {
            format!("sqlite:{}", config.connection_string)
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        if seeds.is_dir() {
            repo.run_seeds(&seeds)
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        } else {
            debug!(dir = %seeds.display(), "no seeds directory, skipping seeds");
        }

        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use finance_core::MonthlyRecord;
    use finance_core::db::{DbConfig, RepositoryFactory};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    /// Full round-trip: factory → SqliteRepository with an in-memory DB and
    /// the bundled seeds.
    #[tokio::test]
    async fn creates_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("failed to create in-memory repository");

        assert_eq!(repo.list_fiscal_years().await.unwrap(), vec![2024]);
    }

    #[tokio::test]
    async fn creates_file_database_that_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finance.db");
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: path.display().to_string(),
        };

        let repo = SqliteRepositoryFactory.create(&config).await.unwrap();
        repo.save_monthly_records(2031, &[]).await.unwrap();
        drop(repo);

        let reopened = SqliteRepositoryFactory.create(&config).await.unwrap();
        assert!(reopened.list_fiscal_years().await.unwrap().contains(&2031));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn reopening_keeps_saved_demo_year() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: dir.path().join("finance.db").display().to_string(),
        };
        let mine = vec![MonthlyRecord::from_components("Q1", dec!(1), dec!(2), dec!(3))];

        let repo = SqliteRepositoryFactory.create(&config).await.unwrap();
        repo.save_monthly_records(2024, &mine).await.unwrap();
        repo.save_budgets(2024, &[]).await.unwrap();
        drop(repo);

        let reopened = SqliteRepositoryFactory.create(&config).await.unwrap();
        assert_eq!(reopened.load_monthly_records(2024).await.unwrap(), mine);
        assert!(reopened.load_budgets(2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "sqlite:finance.db?mode=bogus".to_string(),
        };

        assert!(SqliteRepositoryFactory.create(&config).await.is_err());
    }
}
