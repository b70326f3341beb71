//! Creates the story schema in the configured `PostgreSQL` database.
//!
//! Usage:
//!
//! ```text
//! storydesk_migrate [config-path]
//! ```
//!
//! Without a path the configuration is read from `storydesk.toml` when it
//! exists. The database URL is taken from `database.url`, which is usually
//! supplied as `STORYDESK__DATABASE__URL`. The schema statements are
//! idempotent, so running the tool twice is harmless.

use diesel::r2d2::PoolError;
use std::env;
use std::path::PathBuf;
use storydesk::config::{ConfigLoadError, StorydeskConfig};
use storydesk::story::adapters::postgres::{apply_schema, build_pool};
use storydesk::telemetry::{TelemetryError, init_tracing};
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while bootstrapping the schema.
#[derive(Debug, Error)]
enum MigrateError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("database.url is not configured")]
    MissingDatabaseUrl,
    #[error("failed to connect to the database: {0}")]
    Connect(#[from] PoolError),
    #[error("failed to apply the story schema: {0}")]
    Apply(#[from] diesel::result::Error),
}

fn main() -> Result<(), BoxError> {
    run(env::args_os().skip(1).map(PathBuf::from)).map_err(Into::into)
}

fn run(mut args: impl Iterator<Item = PathBuf>) -> Result<(), MigrateError> {
    let config_path = args.next();
    if let Some(extra) = args.next() {
        return Err(MigrateError::InvalidArgs(format!(
            "unexpected argument {}",
            extra.display()
        )));
    }

    let config = match config_path.as_deref() {
        Some(path) => StorydeskConfig::load_from_file(path)?,
        None => StorydeskConfig::load()?,
    };
    init_tracing(&config.logging)?;

    let url = config
        .database
        .url
        .as_deref()
        .ok_or(MigrateError::MissingDatabaseUrl)?;
    let pool = build_pool(url, config.database.max_connections)?;
    let mut connection = pool.get()?;
    apply_schema(&mut connection)?;
    tracing::info!("story schema is up to date");
    Ok(())
}
