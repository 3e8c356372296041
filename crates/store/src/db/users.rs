//! User repository for database operations.
//!
//! Lookups by name follow exactly-one semantics: no match is
//! `RepositoryError::NotFound`, several matches are
//! `RepositoryError::NotSingular`. Names are not unique in the schema.

use sqlx::AnyPool;
use tracing::{debug, instrument};

use carlot_core::{Age, UserId};

use super::{RepositoryError, cars, insert_returning_id, insert_sql, only};
use crate::dsn::Driver;
use crate::models::{Car, NewUser, User};

const ENTITY: &str = "user";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    age: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let age = Age::new(row.age).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid age for user {}: {e}", row.id))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            age,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a AnyPool,
    driver: Driver,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a AnyPool, driver: Driver) -> Self {
        Self { pool, driver }
    }

    /// Insert a user and link the cars it was built with.
    ///
    /// The insert and the car links share one transaction: if any car is
    /// missing or already owned, nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a car cannot be linked.
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new_user), fields(name = %new_user.name(), age = %new_user.age()))]
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = insert_sql(self.driver, "INSERT INTO users (age, name) VALUES (?, ?)");
        let query = sqlx::query(&sql)
            .bind(new_user.age().get())
            .bind(new_user.name());

        let id = insert_returning_id(&mut tx, self.driver, query)
            .await?
            .map(UserId::new)
            .ok_or_else(|| {
                RepositoryError::DataCorruption("insert did not report a user id".to_string())
            })?;

        for &car_id in new_user.cars() {
            cars::link_owner(&mut tx, car_id, id).await?;
        }

        tx.commit().await?;

        let user = User {
            id,
            name: new_user.name().to_owned(),
            age: new_user.age(),
        };
        debug!(%user, cars = new_user.cars().len(), "Inserted user");
        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, name, age FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the one user with this name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has the name.
    /// Returns `RepositoryError::NotSingular` if several users share it.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn only_by_name(&self, name: &str) -> Result<User, RepositoryError> {
        // Two rows are enough to tell "one" from "many".
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, name, age FROM users WHERE name = ? ORDER BY id LIMIT 2")
                .bind(name)
                .fetch_all(self.pool)
                .await?;

        only(rows, ENTITY)?.try_into()
    }

    /// List every user with this name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_by_name(&self, name: &str) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, name, age FROM users WHERE name = ? ORDER BY id")
                .bind(name)
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List all users, oldest record first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT id, name, age FROM users ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count users with this name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_name(&self, name: &str) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE name = ?")
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Get the owner of `car` by following its `owner_id` back to `users`.
    ///
    /// Reads the current link from the database rather than trusting
    /// `car.owner_id`, which may predate an assignment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the car has no owner.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, car), fields(car_id = %car.id, model = %car.model))]
    pub async fn owner_of(&self, car: &Car) -> Result<User, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"
            SELECT u.id, u.name, u.age
            FROM users u
            JOIN cars c ON c.owner_id = u.id
            WHERE c.id = ?
            LIMIT 2
            ",
        )
        .bind(car.id)
        .fetch_all(self.pool)
        .await?;

        only(rows, ENTITY)?.try_into()
    }
}
