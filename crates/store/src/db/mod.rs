//! Database operations over `MySQL` or `SQLite`.
//!
//! ## Tables
//!
//! - `users` - People who own cars (`name` is indexed but not unique)
//! - `cars` - Registered cars; `owner_id` references `users.id`
//!
//! Both directions of the ownership edge are plain queries over
//! `cars.owner_id`: [`CarRepository::list_for_owner`] walks user -> cars and
//! [`UserRepository::owner_of`] walks car -> user.
//!
//! # Schema
//!
//! Tables are created on demand by [`Client::create_schema`]:
//! ```bash
//! cargo run -p carlot-cli -- migrate
//! ```

pub mod cars;
pub mod schema;
pub mod users;

use std::borrow::Cow;

use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, AnyPool, Row};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::dsn::Driver;

pub use cars::CarRepository;
pub use schema::SchemaError;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A query that expects exactly one row matched none.
    #[error("{entity} not found")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
    },

    /// A query that expects exactly one row matched several.
    #[error("{entity} not singular: multiple results")]
    NotSingular {
        /// Kind of record that was looked up.
        entity: &'static str,
    },

    /// Constraint violation (e.g., car already owned, unknown owner).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected before reaching the database.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl RepositoryError {
    /// Whether this is a "no rows" outcome of an exactly-one query.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a "too many rows" outcome of an exactly-one query.
    #[must_use]
    pub const fn is_not_singular(&self) -> bool {
        matches!(self, Self::NotSingular { .. })
    }
}

/// Reduce a result set to its single row.
pub(crate) fn only<T>(rows: Vec<T>, entity: &'static str) -> Result<T, RepositoryError> {
    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (Some(row), None) => Ok(row),
        (None, _) => Err(RepositoryError::NotFound { entity }),
        (Some(_), Some(_)) => Err(RepositoryError::NotSingular { entity }),
    }
}

/// Map foreign-key failures to `Conflict`, pass everything else through.
pub(crate) fn map_constraint(err: sqlx::Error, what: impl FnOnce() -> String) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::Conflict(what())
        }
        _ => RepositoryError::Database(err),
    }
}

/// Adapt an `INSERT` so [`insert_returning_id`] can read the new key.
///
/// `SQLite` reports the key through `RETURNING`; `MySQL` reports it in the
/// query result.
pub(crate) fn insert_sql(driver: Driver, sql: &'static str) -> Cow<'static, str> {
    match driver {
        Driver::MySql => Cow::Borrowed(sql),
        Driver::Sqlite => Cow::Owned(format!("{sql} RETURNING id")),
    }
}

/// Run an insert built from [`insert_sql`] and return the generated key.
///
/// Both paths read the key on `conn`, the connection that ran the insert.
pub(crate) async fn insert_returning_id<'q>(
    conn: &mut AnyConnection,
    driver: Driver,
    query: Query<'q, Any, AnyArguments<'q>>,
) -> Result<Option<i64>, sqlx::Error> {
    match driver {
        Driver::Sqlite => Ok(Some(query.fetch_one(&mut *conn).await?.try_get(0)?)),
        Driver::MySql => Ok(query.execute(&mut *conn).await?.last_insert_id()),
    }
}

/// Create a connection pool for `config`.
///
/// In-memory `SQLite` databases live and die with their connection, so they
/// get a single connection that is never recycled.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let options = AnyPoolOptions::new().acquire_timeout(config.acquire_timeout);
    let options = if config.url.is_in_memory() {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.max_connections)
    };

    options.connect(config.url.expose()).await
}

/// Handle to the database.
///
/// Constructed once per command and passed by reference to every operation.
/// Call [`Client::close`] when done; dropping the client also releases the
/// pool, but without waiting for connections to shut down.
#[derive(Debug, Clone)]
pub struct Client {
    pool: AnyPool,
    driver: Driver,
}

impl Client {
    /// Open a connection pool.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            driver = %config.driver(),
            url = %config.url.redacted(),
            "Connecting to database"
        );
        let pool = create_pool(config).await?;
        Ok(Self {
            pool,
            driver: config.driver(),
        })
    }

    /// The backend this client talks to.
    #[must_use]
    pub const fn driver(&self) -> Driver {
        self.driver
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// User queries and inserts.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool, self.driver)
    }

    /// Car queries and inserts.
    #[must_use]
    pub const fn cars(&self) -> CarRepository<'_> {
        CarRepository::new(&self.pool, self.driver)
    }

    /// Create any missing tables and indexes.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the object that could not be created.
    pub async fn create_schema(&self) -> Result<(), SchemaError> {
        schema::create_all(&self.pool, self.driver).await
    }

    /// Close every connection and wait for them to shut down.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Database connections closed");
    }
}
