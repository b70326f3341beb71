//! Layered runtime configuration.
//!
//! Values are resolved in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. An optional `storydesk.toml` in the working directory, or an explicit
//!    file passed to [`StorydeskConfig::load_from_file`]
//! 3. Environment variables prefixed with `STORYDESK__`, using `__` between
//!    nested keys, e.g. `STORYDESK__DATABASE__URL`

use crate::story::domain::{MAX_TITLE_COLUMN_WIDTH, WorkflowRules};
use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Base name of the optional configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "storydesk";

const ENV_PREFIX: &str = "STORYDESK";
const ENV_SEPARATOR: &str = "__";

/// Workflow section of the configuration.
pub type WorkflowConfig = WorkflowRules;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Source(#[from] ConfigError),
    /// The resolved values are out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL. Unset means no database is configured.
    pub url: Option<String>,
    /// Upper bound of the connection pool.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 4,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Root configuration for storydesk processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorydeskConfig {
    /// Story validation rules.
    pub workflow: WorkflowConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl StorydeskConfig {
    /// Loads configuration from defaults, an optional `storydesk.toml` and
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when a source is malformed or a value is
    /// out of range.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let file = File::with_name(DEFAULT_CONFIG_FILE).required(false);
        Self::assemble(Some(file), environment())
    }

    /// Loads configuration from defaults, the file at `path` and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when the file is missing or malformed or
    /// a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        Self::assemble(Some(File::from(path)), environment())
    }

    fn assemble(
        file: Option<File<FileSourceFile, FileFormat>>,
        env: Environment,
    ) -> Result<Self, ConfigLoadError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(source) = file {
            builder = builder.add_source(source);
        }
        let resolved: Self = builder.add_source(env).build()?.try_deserialize()?;
        resolved.validate()?;
        Ok(resolved)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.workflow.max_title_length == 0 {
            return Err(ConfigLoadError::Invalid(
                "workflow.max_title_length must be positive".to_owned(),
            ));
        }
        if self.workflow.max_title_length > MAX_TITLE_COLUMN_WIDTH {
            return Err(ConfigLoadError::Invalid(format!(
                "workflow.max_title_length must not exceed {MAX_TITLE_COLUMN_WIDTH}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigLoadError::Invalid(
                "database.max_connections must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
