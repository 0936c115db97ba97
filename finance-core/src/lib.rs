pub mod calculations;
pub mod config;
pub mod db;
pub mod models;

pub use config::{AggregatorConfig, BudgetThresholds};
pub use db::repository::{FinanceRepository, RepositoryError};
pub use models::*;
