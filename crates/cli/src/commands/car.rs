//! Car commands.
//!
//! # Usage
//!
//! ```bash
//! carlot car create Tesla
//! carlot car create Ford --owner 1 --registered-at 2024-05-01T08:30:00Z
//! carlot car list --owner 1 --model Ford
//! carlot car owner 2
//! carlot car assign 2 1
//! ```

use chrono::{DateTime, Utc};

use carlot_core::{CarId, UserId};
use carlot_store::{Car, DemoError, NewCar};

use super::{CliError, Output, with_client};

/// Register a car, owned by `owner` if given.
///
/// # Errors
///
/// Returns `CliError::Demo` if the insert fails or the owner is unknown.
pub async fn create(
    url: Option<&str>,
    output: Output,
    model: String,
    registered_at: Option<DateTime<Utc>>,
    owner: Option<UserId>,
) -> Result<(), CliError> {
    let mut new_car = NewCar::new(model, registered_at.unwrap_or_else(Utc::now));
    if let Some(owner) = owner {
        new_car = new_car.owned_by(owner);
    }

    with_client(url, async |client| {
        let car = client
            .cars()
            .create(&new_car)
            .await
            .map_err(DemoError::CreateCar)?;
        tracing::info!("car was created: {car}");
        output.record(&car)
    })
    .await
}

/// List cars: every car, one owner's cars, or one owner's car of a model.
///
/// # Errors
///
/// Returns `CliError::Demo` if an owner's cars cannot be queried.
pub async fn list(
    url: Option<&str>,
    output: Output,
    owner: Option<UserId>,
    model: Option<&str>,
) -> Result<(), CliError> {
    with_client(url, async |client| {
        let cars = client.cars();
        match (owner, model) {
            (Some(owner), Some(model)) => {
                let car = cars
                    .only_for_owner_with_model(owner, model)
                    .await
                    .map_err(DemoError::QueryCars)?;
                output.record(&car)
            }
            (Some(owner), None) => {
                let owned = cars
                    .list_for_owner(owner)
                    .await
                    .map_err(DemoError::QueryCars)?;
                output.records(&owned)
            }
            (None, _) => output.records(&cars.list_all().await?),
        }
    })
    .await
}

/// Show the owner of `car`.
///
/// # Errors
///
/// Returns `CliError::Missing` if the car does not exist, or
/// `CliError::Demo` if it has no owner.
pub async fn owner(url: Option<&str>, output: Output, car: CarId) -> Result<(), CliError> {
    with_client(url, async |client| {
        let car = find(client.cars().get_by_id(car).await?, car)?;
        let owner = client
            .users()
            .owner_of(&car)
            .await
            .map_err(|source| DemoError::QueryOwner {
                model: car.model.clone(),
                source,
            })?;
        tracing::info!("car {:?} owner: {:?}", car.model, owner.name);
        output.record(&owner)
    })
    .await
}

/// Link the unowned `car` to `owner`.
///
/// # Errors
///
/// Returns `CliError::Repository` if the car is missing, already owned, or
/// the owner does not exist.
pub async fn assign(
    url: Option<&str>,
    output: Output,
    car: CarId,
    owner: UserId,
) -> Result<(), CliError> {
    with_client(url, async |client| {
        let car = client.cars().assign_owner(car, owner).await?;
        tracing::info!(%owner, "car was assigned: {car}");
        output.record(&car)
    })
    .await
}

fn find(car: Option<Car>, id: CarId) -> Result<Car, CliError> {
    car.ok_or(CliError::Missing {
        entity: "car",
        id: id.as_i64(),
    })
}
