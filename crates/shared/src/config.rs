//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Migration runner configuration.
    #[serde(default)]
    pub migrations: MigrationsConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

/// Migration runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationsConfig {
    /// Name recorded in the lock row while this process runs migrations.
    #[serde(default = "default_lock_holder")]
    pub lock_holder: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            lock_holder: default_lock_holder(),
        }
    }
}

fn default_lock_holder() -> String {
    format!("migrator-{}", std::process::id())
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STINT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
