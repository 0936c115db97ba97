use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use finance_data::{BudgetLoader, MonthlyRecordLoader, TaxBracketLoader};
use finance_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Load dashboard data from CSV files into the database.
///
/// Each file replaces what is stored for the fiscal years (or tax schedules)
/// it mentions and leaves everything else untouched.
///
/// - monthly: fiscal_year, month, team_salary, intern_stipend, tasks, total
/// - brackets: schedule, min, max, rate
/// - budgets: fiscal_year, category, allocated, spent
#[derive(Parser, Debug)]
#[command(name = "finance-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL (e.g., sqlite:finance.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:finance.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// CSV file of monthly cost records
    #[arg(long)]
    monthly: Option<PathBuf>,

    /// CSV file of tax brackets
    #[arg(long)]
    brackets: Option<PathBuf>,

    /// CSV file of budgets
    #[arg(long)]
    budgets: Option<PathBuf>,
}

fn open(path: &PathBuf) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if let Some(path) = &args.monthly {
        let rows = MonthlyRecordLoader::parse(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let stored = MonthlyRecordLoader::load(&repo, &rows)
            .await
            .context("Failed to load monthly records into database")?;
        println!("Loaded {} monthly records from {}", stored, path.display());
    }

    if let Some(path) = &args.brackets {
        let rows = TaxBracketLoader::parse(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let stored = TaxBracketLoader::load(&repo, &rows)
            .await
            .context("Failed to load tax brackets into database")?;
        println!("Loaded {} tax brackets from {}", stored, path.display());
    }

    if let Some(path) = &args.budgets {
        let rows = BudgetLoader::parse(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let stored = BudgetLoader::load(&repo, &rows)
            .await
            .context("Failed to load budgets into database")?;
        println!("Loaded {} budgets from {}", stored, path.display());
    }

    Ok(())
}
