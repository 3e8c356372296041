//! The user/car walkthrough.
//!
//! Each step is a standalone function over a [`Client`] so commands can run
//! them one at a time; [`run`] chains them in order:
//!
//! 1. ensure the schema exists
//! 2. with `seed`, create two cars and a user that owns both
//! 3. otherwise look the user up by name
//! 4. list the user's cars and pick one by model
//! 5. walk every car back to its owner
//!
//! Every step wraps its failure with the operation that failed, e.g.
//! `failed querying user: user not found`.

use thiserror::Error;
use tracing::{info, instrument};

use carlot_core::Age;

use crate::db::{Client, RepositoryError, SchemaError};
use crate::models::{Car, NewCar, NewUser, User};

/// Model of the first demo car.
pub const FIRST_MODEL: &str = "Tesla";

/// Model of the second demo car.
pub const SECOND_MODEL: &str = "Ford";

/// Errors from the walkthrough, one per step.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Schema creation failed.
    #[error("failed creating schema resources: {0}")]
    Schema(#[from] SchemaError),

    /// User insert failed.
    #[error("failed creating user: {0}")]
    CreateUser(#[source] RepositoryError),

    /// User lookup failed.
    #[error("failed querying user: {0}")]
    QueryUser(#[source] RepositoryError),

    /// Car insert failed.
    #[error("failed creating car: {0}")]
    CreateCar(#[source] RepositoryError),

    /// Listing or filtering the user's cars failed.
    #[error("failed querying user cars: {0}")]
    QueryCars(#[source] RepositoryError),

    /// Walking from a car to its owner failed.
    #[error("failed querying car {model:?} owner: {source}")]
    QueryOwner {
        /// Model of the car whose owner was looked up.
        model: String,
        /// Underlying lookup failure.
        #[source]
        source: RepositoryError,
    },
}

impl DemoError {
    /// The repository failure behind this error, if there is one.
    #[must_use]
    pub const fn repository(&self) -> Option<&RepositoryError> {
        match self {
            Self::Schema(_) => None,
            Self::CreateUser(e)
            | Self::QueryUser(e)
            | Self::CreateCar(e)
            | Self::QueryCars(e)
            | Self::QueryOwner { source: e, .. } => Some(e),
        }
    }
}

/// Inputs for [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOptions {
    /// Name of the user to create or look up.
    pub name: String,
    /// Age given to a seeded user.
    pub age: Age,
    /// Create the cars and their owner before querying.
    pub seed: bool,
    /// Model to pick out of the user's cars, if any.
    pub model: Option<String>,
}

impl DemoOptions {
    /// Look up `name` without seeding, picking the second demo car.
    #[must_use]
    pub fn new(name: impl Into<String>, age: Age) -> Self {
        Self {
            name: name.into(),
            age,
            seed: false,
            model: Some(SECOND_MODEL.to_string()),
        }
    }

    /// Create the demo records first.
    #[must_use]
    pub const fn seeded(mut self) -> Self {
        self.seed = true;
        self
    }

    /// Pick `model` out of the user's cars, or skip the filter with `None`.
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// What [`run`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// The user the walkthrough ran for.
    pub user: User,
    /// Every car the user owns.
    pub cars: Vec<Car>,
    /// The car picked by model, if a model was requested.
    pub filtered: Option<Car>,
    /// Each car paired with the owner read back through the inverse edge.
    pub owners: Vec<(Car, User)>,
}

/// Insert a user with no cars.
///
/// # Errors
///
/// Returns `DemoError::CreateUser` if the insert fails.
pub async fn create_user(client: &Client, name: &str, age: Age) -> Result<User, DemoError> {
    let user = client
        .users()
        .create(&NewUser::new(name, age))
        .await
        .map_err(DemoError::CreateUser)?;
    info!("user was created: {user}");
    Ok(user)
}

/// Get the one user called `name`.
///
/// # Errors
///
/// Returns `DemoError::QueryUser` if there is no such user, or several.
pub async fn query_user(client: &Client, name: &str) -> Result<User, DemoError> {
    let user = client
        .users()
        .only_by_name(name)
        .await
        .map_err(DemoError::QueryUser)?;
    info!("user returned: {user}");
    Ok(user)
}

/// Create a Tesla and a Ford, then a user that owns both.
///
/// # Errors
///
/// Returns `DemoError::CreateCar` if a car insert fails, or
/// `DemoError::CreateUser` if the user insert or the linking fails.
#[instrument(skip(client))]
pub async fn create_cars(client: &Client, name: &str, age: Age) -> Result<User, DemoError> {
    let mut ids = Vec::with_capacity(2);
    for model in [FIRST_MODEL, SECOND_MODEL] {
        let car = client
            .cars()
            .create(&NewCar::registered_now(model))
            .await
            .map_err(DemoError::CreateCar)?;
        info!("car was created: {car}");
        ids.push(car.id);
    }

    let user = client
        .users()
        .create(&NewUser::new(name, age).with_cars(ids))
        .await
        .map_err(DemoError::CreateUser)?;
    info!("user was created: {user}");
    Ok(user)
}

/// List the cars of `user`, then pick the one matching `model`.
///
/// # Errors
///
/// Returns `DemoError::QueryCars` if listing fails, or if `model` matches
/// none or several of the user's cars.
#[instrument(skip(client, user), fields(user_id = %user.id))]
pub async fn query_cars(
    client: &Client,
    user: &User,
    model: Option<&str>,
) -> Result<(Vec<Car>, Option<Car>), DemoError> {
    let cars = client
        .cars()
        .list_for_owner(user.id)
        .await
        .map_err(DemoError::QueryCars)?;
    info!("returned cars: [{}]", join(&cars));

    let Some(model) = model else {
        return Ok((cars, None));
    };

    let car = client
        .cars()
        .only_for_owner_with_model(user.id, model)
        .await
        .map_err(DemoError::QueryCars)?;
    info!("{car}");
    Ok((cars, Some(car)))
}

/// Read the owner of each of `user`'s cars back through `cars.owner_id`.
///
/// # Errors
///
/// Returns `DemoError::QueryCars` if listing fails, or
/// `DemoError::QueryOwner` naming the first car whose owner is missing.
#[instrument(skip(client, user), fields(user_id = %user.id))]
pub async fn query_car_users(client: &Client, user: &User) -> Result<Vec<(Car, User)>, DemoError> {
    let cars = client
        .cars()
        .list_for_owner(user.id)
        .await
        .map_err(DemoError::QueryCars)?;

    let mut owners = Vec::with_capacity(cars.len());
    for car in cars {
        let owner = client
            .users()
            .owner_of(&car)
            .await
            .map_err(|source| DemoError::QueryOwner {
                model: car.model.clone(),
                source,
            })?;
        info!("car {:?} owner: {:?}", car.model, owner.name);
        owners.push((car, owner));
    }

    Ok(owners)
}

/// Run every step in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the `DemoError` of the step that failed.
pub async fn run(client: &Client, options: &DemoOptions) -> Result<DemoReport, DemoError> {
    client.create_schema().await?;

    let user = if options.seed {
        create_cars(client, &options.name, options.age).await?
    } else {
        query_user(client, &options.name).await?
    };

    let (cars, filtered) = query_cars(client, &user, options.model.as_deref()).await?;
    let owners = query_car_users(client, &user).await?;

    Ok(DemoReport {
        user,
        cars,
        filtered,
        owners,
    })
}

fn join(cars: &[Car]) -> String {
    cars.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
