//! End-to-end report generation against the bundled demo data.

use std::io::Write;

use finance_cli::app::{build_registry, load_report_inputs, summarize};
use finance_cli::settings::{Overrides, Settings};
use finance_core::db::DbConfig;
use finance_core::{BudgetStatus, FinanceRepository, MonthlyRecord};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

/// In-memory SQLite with migrations and seeds applied.
async fn seeded_repo() -> Box<dyn FinanceRepository> {
    build_registry()
        .create(&DbConfig::default())
        .await
        .expect("Failed to open seeded database")
}

#[tokio::test]
async fn registry_offers_sqlite_and_memory() {
    assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
}

#[tokio::test]
async fn reports_newest_stored_year_by_default() {
    let repo = seeded_repo().await;
    let settings = Settings::default();

    let inputs = load_report_inputs(&*repo, &settings.report).await.unwrap();

    assert_eq!(inputs.fiscal_year, 2024);
    assert_eq!(inputs.records.len(), 6);
    assert_eq!(inputs.brackets.len(), 4);
    assert_eq!(inputs.budgets.len(), 4);
}

#[tokio::test]
async fn summary_over_seeded_year() {
    let repo = seeded_repo().await;
    let mut settings = Settings::default();
    settings.apply(Overrides {
        income: Some(dec!(25000)),
        ..Default::default()
    });

    let inputs = load_report_inputs(&*repo, &settings.report).await.unwrap();
    let summary = summarize(&inputs, &settings);

    assert_eq!(summary.ytd.total, dec!(416000));
    assert_eq!(summary.average_monthly_spending, dec!(69333.33));
    assert_eq!(summary.forecast.as_ref().map(Vec::len), Ok(3));
    assert!(summary.inconsistent_months.is_empty());

    let payroll = summary.payroll.as_ref().expect("income was given");
    assert_eq!(payroll.tax, dec!(4000));
    assert_eq!(payroll.net, dec!(21000));

    let statuses: Vec<_> = summary
        .budgets
        .iter()
        .map(|b| (b.category.as_str(), b.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Engineering", BudgetStatus::Warning),
            ("Interns", BudgetStatus::Healthy),
            ("Marketing", BudgetStatus::Warning),
            ("Operations", BudgetStatus::Critical),
        ]
    );

    let printed = summary.to_string();
    assert!(printed.contains("Year to date (6 months)"));
    assert!(printed.contains("Payroll tax on 25000"));
    assert!(printed.contains("critical (red)"));
}

#[tokio::test]
async fn csv_records_replace_stored_ones() {
    let repo = seeded_repo().await;
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        csv,
        "fiscal_year,month,team_salary,intern_stipend,tasks,total\n\
         2025,Jan,70,10,20,\n\
         2025,Feb,77,11,22,"
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.apply(Overrides {
        csv: Some(csv.path().to_path_buf()),
        ..Default::default()
    });

    let inputs = load_report_inputs(&*repo, &settings.report).await.unwrap();

    assert_eq!(inputs.fiscal_year, 2025);
    assert_eq!(inputs.records.len(), 2);
    assert_eq!(inputs.records[1].total, dec!(110));
    assert!(inputs.budgets.is_empty());

    let summary = summarize(&inputs, &settings);
    let forecast = summary.forecast.unwrap();
    assert_eq!(forecast[0].total, dec!(121));
}

#[tokio::test]
async fn zero_month_fails_forecast_unless_strict() {
    let repo = build_registry()
        .create(&DbConfig {
            backend: "memory".to_string(),
            connection_string: String::new(),
        })
        .await
        .unwrap();
    repo.save_monthly_records(
        2024,
        &[
            MonthlyRecord::from_components("Jan", dec!(0), dec!(0), dec!(0)),
            MonthlyRecord::from_components("Feb", dec!(70), dec!(10), dec!(20)),
            MonthlyRecord::from_components("Mar", dec!(77), dec!(11), dec!(22)),
        ],
    )
    .await
    .unwrap();

    let mut settings = Settings::default();
    let inputs = load_report_inputs(&*repo, &settings.report).await.unwrap();
    let summary = summarize(&inputs, &settings);
    assert!(summary.forecast.is_err());
    assert!(summary.to_string().contains("Forecast unavailable"));

    settings.apply(Overrides {
        strict: true,
        ..Default::default()
    });
    let summary = summarize(&inputs, &settings);
    assert_eq!(summary.forecast.unwrap()[0].total, dec!(121));
}

#[tokio::test]
async fn unknown_backend_is_reported() {
    let result = build_registry()
        .create(&DbConfig {
            backend: "postgres".to_string(),
            connection_string: String::new(),
        })
        .await;
    assert!(result.is_err());
}
