use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finance_core::{Budget, FinanceRepository, MonthlyRecord, RepositoryError, TaxBracket};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::decimal::{TIMESTAMP_FORMAT, get_decimal, get_optional_decimal, parse_timestamp};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            info!(seed = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_monthly_record(row: &SqliteRow) -> Result<MonthlyRecord, RepositoryError> {
    Ok(MonthlyRecord {
        month: row.try_get("month").map_err(db_error)?,
        team_salary: get_decimal(row, "team_salary")?,
        intern_stipend: get_decimal(row, "intern_stipend")?,
        tasks: get_decimal(row, "tasks")?,
        total: get_decimal(row, "total")?,
    })
}

fn row_to_tax_bracket(row: &SqliteRow) -> Result<TaxBracket, RepositoryError> {
    Ok(TaxBracket {
        min: get_decimal(row, "min_value")?,
        max: get_optional_decimal(row, "max_value")?,
        rate: get_decimal(row, "rate")?,
    })
}

fn row_to_budget(row: &SqliteRow) -> Result<Budget, RepositoryError> {
    Ok(Budget {
        category: row.try_get("category").map_err(db_error)?,
        allocated: get_decimal(row, "allocated")?,
        spent: get_decimal(row, "spent")?,
    })
}

#[async_trait]
impl FinanceRepository for SqliteRepository {
    async fn list_fiscal_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query("SELECT fiscal_year FROM fiscal_year_snapshots ORDER BY fiscal_year DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| row.try_get("fiscal_year").map_err(db_error))
            .collect()
    }

    async fn load_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<MonthlyRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT month, team_salary, intern_stipend, tasks, total
             FROM monthly_records
             WHERE fiscal_year = ?
             ORDER BY position",
        )
        .bind(fiscal_year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_monthly_record).collect()
    }

    async fn save_monthly_records(
        &self,
        fiscal_year: i32,
        records: &[MonthlyRecord],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM monthly_records WHERE fiscal_year = ?")
            .bind(fiscal_year)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query(
                "INSERT INTO monthly_records (
                    fiscal_year, position, month, team_salary, intern_stipend, tasks, total
                ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(fiscal_year)
            .bind(position as i64)
            .bind(&record.month)
            .bind(record.team_salary.to_string())
            .bind(record.intern_stipend.to_string())
            .bind(record.tasks.to_string())
            .bind(record.total.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        sqlx::query(
            "INSERT INTO fiscal_year_snapshots (fiscal_year, saved_at) VALUES (?, ?)
             ON CONFLICT (fiscal_year) DO UPDATE SET saved_at = excluded.saved_at",
        )
        .bind(fiscal_year)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        debug!(fiscal_year, count = records.len(), "saved monthly records");

        Ok(records.len())
    }

    async fn delete_monthly_records(
        &self,
        fiscal_year: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let snapshot = sqlx::query("DELETE FROM fiscal_year_snapshots WHERE fiscal_year = ?")
            .bind(fiscal_year)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let records = sqlx::query("DELETE FROM monthly_records WHERE fiscal_year = ?")
            .bind(fiscal_year)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if snapshot.rows_affected() == 0 && records.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn last_saved_at(
        &self,
        fiscal_year: i32,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let row = sqlx::query("SELECT saved_at FROM fiscal_year_snapshots WHERE fiscal_year = ?")
            .bind(fiscal_year)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        let saved_at: String = row.try_get("saved_at").map_err(db_error)?;
        parse_timestamp(&saved_at)
    }

    async fn list_tax_schedules(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT DISTINCT schedule FROM tax_brackets ORDER BY schedule")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| row.try_get("schedule").map_err(db_error))
            .collect()
    }

    async fn load_tax_brackets(
        &self,
        schedule: &str,
    ) -> Result<Vec<TaxBracket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT min_value, max_value, rate
             FROM tax_brackets
             WHERE schedule = ?
             ORDER BY id",
        )
        .bind(schedule)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        // Stored as TEXT, so order numerically here rather than in SQL.
        let mut brackets = rows
            .iter()
            .map(row_to_tax_bracket)
            .collect::<Result<Vec<_>, _>>()?;
        brackets.sort_by(|a, b| a.min.cmp(&b.min));
        Ok(brackets)
    }

    async fn save_tax_brackets(
        &self,
        schedule: &str,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM tax_brackets WHERE schedule = ?")
            .bind(schedule)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for bracket in brackets {
            sqlx::query(
                "INSERT INTO tax_brackets (schedule, min_value, max_value, rate)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(schedule)
            .bind(bracket.min.to_string())
            .bind(bracket.max.map(|d| d.to_string()))
            .bind(bracket.rate.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        debug!(schedule, count = brackets.len(), "saved tax brackets");

        Ok(brackets.len())
    }

    async fn load_budgets(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<Budget>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT category, allocated, spent
             FROM budgets
             WHERE fiscal_year = ?
             ORDER BY category",
        )
        .bind(fiscal_year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_budget).collect()
    }

    async fn save_budgets(
        &self,
        fiscal_year: i32,
        budgets: &[Budget],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM budgets WHERE fiscal_year = ?")
            .bind(fiscal_year)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for budget in budgets {
            sqlx::query(
                "INSERT INTO budgets (fiscal_year, category, allocated, spent)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(fiscal_year)
            .bind(&budget.category)
            .bind(budget.allocated.to_string())
            .bind(budget.spent.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        debug!(fiscal_year, count = budgets.len(), "saved budgets");

        Ok(budgets.len())
    }
}
