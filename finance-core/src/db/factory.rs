use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::{FinanceRepository, RepositoryError};

/// Where dashboard state lives: the `[database]` table of the report
/// settings file, or `--backend`/`--db` on the command line.
///
/// An empty table opens an in-memory SQLite database holding the demo year.
///
/// | backend  | connection_string                       | persists  |
/// |----------|-----------------------------------------|-----------|
/// | `sqlite` | `finance.db`, `sqlite:x.db`, `:memory:` | file only |
/// | `memory` | ignored                                 | no        |
///
/// ```toml
/// [database]
/// backend = "sqlite"
/// connection_string = "finance.db"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Forwarded untouched; only the chosen backend interprets it.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens one kind of store. `finance-core` ships the `memory` factory and
/// `finance-db-sqlite` the `sqlite` one; the report binary registers both.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens the store. The SQLite factory migrates and seeds here, so the
    /// returned repository is ready to load.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError>;
}

/// Maps `DbConfig::backend` to the factory that opens it.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the store named by `config.backend`.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] naming the registered backends when
    /// `config.backend` is unknown; otherwise whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        debug!(backend = %config.backend, "opening repository");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
