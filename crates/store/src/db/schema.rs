//! Schema creation.
//!
//! Every statement is create-if-missing, so [`create_all`] is safe to run on
//! each startup. `registered_at` is stored as RFC 3339 text (UTC,
//! microsecond precision) on both backends so it sorts lexically and decodes
//! through the `Any` driver.

use sqlx::AnyPool;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::dsn::Driver;

/// Errors that can occur while creating the schema.
#[derive(Debug, Error)]
#[error("failed creating {object}: {source}")]
pub struct SchemaError {
    /// Table or index that could not be created.
    pub object: &'static str,
    /// Underlying database error.
    #[source]
    pub source: sqlx::Error,
}

/// Named DDL statement.
type Statement = (&'static str, &'static str);

// MySQL has no `CREATE INDEX IF NOT EXISTS`, so indexes are declared inline
// (the foreign key gets its index implicitly).
const MYSQL: &[Statement] = &[
    (
        "table users",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id BIGINT NOT NULL AUTO_INCREMENT,
            age BIGINT NOT NULL,
            name VARCHAR(255) NOT NULL DEFAULT 'unknown',
            PRIMARY KEY (id),
            INDEX user_name (name)
        ) ENGINE = InnoDB DEFAULT CHARSET = utf8mb4
        ",
    ),
    (
        "table cars",
        r"
        CREATE TABLE IF NOT EXISTS cars (
            id BIGINT NOT NULL AUTO_INCREMENT,
            model VARCHAR(255) NOT NULL,
            registered_at VARCHAR(32) NOT NULL,
            owner_id BIGINT NULL,
            PRIMARY KEY (id),
            CONSTRAINT cars_users_cars FOREIGN KEY (owner_id)
                REFERENCES users (id) ON DELETE SET NULL
        ) ENGINE = InnoDB DEFAULT CHARSET = utf8mb4
        ",
    ),
];

const SQLITE: &[Statement] = &[
    (
        "table users",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            age INTEGER NOT NULL,
            name TEXT NOT NULL DEFAULT 'unknown'
        )
        ",
    ),
    (
        "index user_name",
        "CREATE INDEX IF NOT EXISTS user_name ON users (name)",
    ),
    (
        "table cars",
        r"
        CREATE TABLE IF NOT EXISTS cars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            owner_id INTEGER NULL REFERENCES users (id) ON DELETE SET NULL
        )
        ",
    ),
    (
        "index car_owner_id",
        "CREATE INDEX IF NOT EXISTS car_owner_id ON cars (owner_id)",
    ),
];

/// DDL for `driver`, in dependency order.
#[must_use]
pub const fn statements(driver: Driver) -> &'static [Statement] {
    match driver {
        Driver::MySql => MYSQL,
        Driver::Sqlite => SQLITE,
    }
}

/// Create all tables and indexes that do not exist yet.
///
/// # Errors
///
/// Returns `SchemaError` for the first statement that fails.
#[instrument(skip(pool))]
pub async fn create_all(pool: &AnyPool, driver: Driver) -> Result<(), SchemaError> {
    for &(object, sql) in statements(driver) {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|source| SchemaError { object, source })?;
        debug!(object, "Ensured schema object");
    }

    info!("Schema is up to date");
    Ok(())
}
