use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::debug;

use finance_cli::settings::{Overrides, Settings};
use finance_cli::{app, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Startup cost dashboard report.
///
/// Loads a fiscal year of monthly costs, then prints year-to-date totals,
/// average spending, a growth forecast, payroll tax and budget health.
#[derive(Debug, Parser)]
#[command(name = "finance-report", version)]
struct Cli {
    /// TOML settings file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database backend to use (`sqlite` or `memory`).
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `finance.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Fiscal year to report on. Defaults to the newest stored year.
    #[arg(long)]
    year: Option<i32>,

    /// Read monthly records from this CSV instead of the database.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Tax schedule for the payroll line.
    #[arg(long)]
    schedule: Option<String>,

    /// Payroll income to compute tax and net pay for.
    #[arg(long)]
    income: Option<Decimal>,

    /// Months to forecast.
    #[arg(long)]
    months: Option<usize>,

    /// Skip zero-total months when learning the growth trend.
    #[arg(long)]
    strict: bool,

    /// Log filter, e.g. `info` or `finance_core=debug`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            db: self.db.clone(),
            year: self.year,
            csv: self.csv.clone(),
            schedule: self.schedule.clone(),
            income: self.income,
            months: self.months,
            strict: self.strict,
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let mut settings = Settings::load_or_default(cli.config.as_deref())?;
    settings.apply(cli.overrides());

    debug!("connecting to {} backend", settings.database.backend);
    let registry = app::build_registry();
    let repo = registry
        .create(&settings.database)
        .await
        .with_context(|| format!("Failed to open {} backend", settings.database.backend))?;

    let inputs = app::load_report_inputs(&*repo, &settings.report).await?;
    let summary = app::summarize(&inputs, &settings);

    println!("Fiscal year {}", inputs.fiscal_year);
    println!();
    print!("{summary}");

    Ok(())
}
