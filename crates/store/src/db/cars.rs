//! Car repository for database operations.
//!
//! Ownership lives in the nullable `cars.owner_id` column. A car can be
//! linked once: linking a car that already has an owner is a conflict.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{AnyConnection, AnyPool};
use tracing::{debug, instrument};

use carlot_core::{CarId, UserId};

use super::{RepositoryError, insert_returning_id, insert_sql, map_constraint, only};
use crate::dsn::Driver;
use crate::models::{Car, NewCar};

const ENTITY: &str = "car";

/// Stored timestamps keep microseconds; finer digits are dropped on insert.
const TIMESTAMP_DIGITS: u16 = 6;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for car queries.
#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: i64,
    model: String,
    registered_at: String,
    owner_id: Option<i64>,
}

impl TryFrom<CarRow> for Car {
    type Error = RepositoryError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        let registered_at = DateTime::parse_from_rfc3339(&row.registered_at)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid registered_at for car {}: {e}",
                    row.id
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: CarId::new(row.id),
            model: row.model,
            registered_at,
            owner_id: row.owner_id.map(UserId::new),
        })
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Point `car` at `owner` if it has no owner yet.
pub(super) async fn link_owner(
    conn: &mut AnyConnection,
    car: CarId,
    owner: UserId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE cars SET owner_id = ? WHERE id = ? AND owner_id IS NULL")
        .bind(owner)
        .bind(car)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_constraint(e, || format!("user {owner} does not exist")))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(format!(
            "car {car} does not exist or already has an owner"
        )));
    }

    debug!(%car, %owner, "Linked car to owner");
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for car database operations.
pub struct CarRepository<'a> {
    pool: &'a AnyPool,
    driver: Driver,
}

impl<'a> CarRepository<'a> {
    /// Create a new car repository.
    #[must_use]
    pub const fn new(pool: &'a AnyPool, driver: Driver) -> Self {
        Self { pool, driver }
    }

    /// Insert a car, with its owner if one was set.
    ///
    /// The insert and the key lookup share one transaction, so a failed
    /// create leaves no row behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the model is blank.
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new_car), fields(model = %new_car.model(), owner = ?new_car.owner()))]
    pub async fn create(&self, new_car: &NewCar) -> Result<Car, RepositoryError> {
        if new_car.model().trim().is_empty() {
            return Err(RepositoryError::Validation(
                "car model cannot be empty".to_string(),
            ));
        }

        let registered_at = new_car.registered_at().trunc_subsecs(TIMESTAMP_DIGITS);
        let owner = new_car.owner();

        let mut tx = self.pool.begin().await?;

        let sql = insert_sql(
            self.driver,
            "INSERT INTO cars (model, registered_at, owner_id) VALUES (?, ?, ?)",
        );
        let query = sqlx::query(&sql)
            .bind(new_car.model())
            .bind(format_timestamp(registered_at))
            .bind(owner);

        let id = insert_returning_id(&mut tx, self.driver, query)
            .await
            .map_err(|e| {
                map_constraint(e, || match owner {
                    Some(owner) => format!("user {owner} does not exist"),
                    None => "foreign key violation".to_string(),
                })
            })?
            .map(CarId::new)
            .ok_or_else(|| {
                RepositoryError::DataCorruption("insert did not report a car id".to_string())
            })?;

        tx.commit().await?;

        let car = Car {
            id,
            model: new_car.model().to_owned(),
            registered_at,
            owner_id: owner,
        };
        debug!(%car, "Inserted car");
        Ok(car)
    }

    /// Get a car by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let row: Option<CarRow> = sqlx::query_as(
            "SELECT id, model, registered_at, owner_id FROM cars WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all cars, oldest record first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Car>, RepositoryError> {
        let rows: Vec<CarRow> =
            sqlx::query_as("SELECT id, model, registered_at, owner_id FROM cars ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the cars owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Car>, RepositoryError> {
        let rows: Vec<CarRow> = sqlx::query_as(
            r"
            SELECT id, model, registered_at, owner_id
            FROM cars
            WHERE owner_id = ?
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get the one car of `owner` with this model.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no such car.
    /// Returns `RepositoryError::NotSingular` if the owner has several.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn only_for_owner_with_model(
        &self,
        owner: UserId,
        model: &str,
    ) -> Result<Car, RepositoryError> {
        let rows: Vec<CarRow> = sqlx::query_as(
            r"
            SELECT id, model, registered_at, owner_id
            FROM cars
            WHERE owner_id = ? AND model = ?
            ORDER BY id
            LIMIT 2
            ",
        )
        .bind(owner)
        .bind(model)
        .fetch_all(self.pool)
        .await?;

        only(rows, ENTITY)?.try_into()
    }

    /// Link an unowned car to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the car is missing, already
    /// owned, or the owner does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn assign_owner(&self, car: CarId, owner: UserId) -> Result<Car, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        link_owner(&mut conn, car, owner).await?;
        drop(conn);

        self.get_by_id(car)
            .await?
            .ok_or(RepositoryError::NotFound { entity: ENTITY })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(registered_at: &str) -> CarRow {
        CarRow {
            id: 1,
            model: "Tesla".to_string(),
            registered_at: registered_at.to_string(),
            owner_id: Some(3),
        }
    }

    #[test]
    fn test_timestamp_format_is_fixed_width_utc() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2024-05-01T08:30:00.000000Z");
    }

    #[test]
    fn test_row_conversion() {
        let car = Car::try_from(row("2024-05-01T08:30:00.000000Z")).unwrap();
        assert_eq!(car.id, CarId::new(1));
        assert_eq!(car.owner_id, Some(UserId::new(3)));
        assert_eq!(
            car.registered_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_row_conversion_rejects_bad_timestamp() {
        let err = Car::try_from(row("yesterday")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
