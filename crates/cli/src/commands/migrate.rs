//! Schema command.
//!
//! # Usage
//!
//! ```bash
//! carlot migrate
//! carlot --database-url sqlite://carlot.db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CARLOT_DATABASE_URL` - `MySQL` or `SQLite` connection URL
//! - `CARLOT_DB_DRIVER` / `CARLOT_DB_DSN` - driver name plus DSN, used when no URL is set

use super::{CliError, with_client};

/// Create every missing table and index.
///
/// # Errors
///
/// Returns `CliError::Schema` naming the object that could not be created.
pub async fn run(url: Option<&str>) -> Result<(), CliError> {
    with_client(url, async |client| {
        tracing::info!(driver = %client.driver(), "Creating schema resources...");
        client.create_schema().await?;
        tracing::info!("Schema resources created");
        Ok(())
    })
    .await
}
