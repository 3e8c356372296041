//! Command implementations.
//!
//! Every command opens one [`Client`] through [`with_client`], which closes
//! it again whether the command succeeded or not.

pub mod car;
pub mod demo;
pub mod migrate;
pub mod user;

use core::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use carlot_store::{
    Client, ConfigError, DatabaseConfig, DatabaseUrl, DemoError, Driver, RepositoryError,
    SchemaError,
};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Database settings are missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The database could not be reached.
    #[error("failed opening connection to {driver}: {source}")]
    Connect {
        /// Backend that was dialed.
        driver: Driver,
        /// Underlying connection failure.
        #[source]
        source: sqlx::Error,
    },

    /// Schema creation failed.
    #[error("failed creating schema resources: {0}")]
    Schema(#[from] SchemaError),

    /// A walkthrough step failed.
    #[error(transparent)]
    Demo(#[from] DemoError),

    /// A record operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A record addressed by id does not exist.
    #[error("{entity} {id} not found")]
    Missing {
        /// Kind of record.
        entity: &'static str,
        /// Requested id.
        id: i64,
    },

    /// Records could not be rendered as JSON.
    #[error("failed encoding output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolve the database settings, preferring an explicit URL.
fn database_config(url: Option<&str>) -> Result<DatabaseConfig, CliError> {
    match url {
        Some(url) => {
            let url = DatabaseUrl::parse(url).map_err(ConfigError::from)?;
            Ok(DatabaseConfig::new(url))
        }
        None => Ok(DatabaseConfig::from_env()?),
    }
}

/// Open a client.
///
/// # Errors
///
/// Returns `CliError::Config` or `CliError::Connect`.
pub async fn connect(url: Option<&str>) -> Result<Client, CliError> {
    let config = database_config(url)?;
    Client::connect(&config)
        .await
        .map_err(|source| CliError::Connect {
            driver: config.driver(),
            source,
        })
}

/// Run `f` against a fresh client and close the client afterwards.
///
/// # Errors
///
/// Returns the connection error, or whatever `f` returned.
pub async fn with_client<T>(
    url: Option<&str>,
    f: impl AsyncFnOnce(&Client) -> Result<T, CliError>,
) -> Result<T, CliError> {
    let client = connect(url).await?;
    let result = f(&client).await;
    client.close().await;
    result
}

/// Where command results go: one `Display` line per record, or JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    /// Create an output sink.
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print a single record.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Json` if the record cannot be encoded.
    pub fn record<T: Serialize + Display>(self, record: &T) -> Result<(), CliError> {
        let line = if self.json {
            serde_json::to_string(record)?
        } else {
            record.to_string()
        };
        emit(&line);
        Ok(())
    }

    /// Print a list of records.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Json` if the records cannot be encoded.
    pub fn records<T: Serialize + Display>(self, records: &[T]) -> Result<(), CliError> {
        if self.json {
            emit(&serde_json::to_string(records)?);
        } else {
            for record in records {
                emit(&record.to_string());
            }
        }
        Ok(())
    }
}

#[allow(clippy::print_stdout)]
fn emit(line: &str) {
    println!("{line}");
}
