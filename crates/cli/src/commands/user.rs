//! User commands.
//!
//! # Usage
//!
//! ```bash
//! carlot user create --name a8m --age 30
//! carlot user create --age 41 --car 1 --car 2
//! carlot user show a8m
//! carlot user count a8m
//! carlot user list --name a8m
//! ```

use carlot_core::{Age, CarId};
use carlot_store::{DemoError, NewUser, demo};

use super::{CliError, Output, with_client};

/// Create a user, linking `cars` in the same transaction.
///
/// # Errors
///
/// Returns `CliError::Demo` if the insert or a car link fails.
pub async fn create(
    url: Option<&str>,
    output: Output,
    name: Option<String>,
    age: Age,
    cars: Vec<CarId>,
) -> Result<(), CliError> {
    let new_user = match name {
        Some(name) => NewUser::new(name, age),
        None => NewUser::unnamed(age),
    }
    .with_cars(cars);

    with_client(url, async |client| {
        let user = client
            .users()
            .create(&new_user)
            .await
            .map_err(DemoError::CreateUser)?;
        tracing::info!("user was created: {user}");
        output.record(&user)
    })
    .await
}

/// Show the one user called `name`.
///
/// # Errors
///
/// Returns `CliError::Demo` if there is no such user, or several.
pub async fn show(url: Option<&str>, output: Output, name: &str) -> Result<(), CliError> {
    with_client(url, async |client| {
        let user = demo::query_user(client, name).await?;
        output.record(&user)
    })
    .await
}

/// Print how many users are called `name`.
///
/// # Errors
///
/// Returns `CliError::Repository` if the query fails.
pub async fn count(url: Option<&str>, output: Output, name: &str) -> Result<(), CliError> {
    with_client(url, async |client| {
        let count = client.users().count_by_name(name).await?;
        output.record(&count)
    })
    .await
}

/// List users, all of them or those called `name`.
///
/// # Errors
///
/// Returns `CliError::Repository` if the query fails.
pub async fn list(url: Option<&str>, output: Output, name: Option<&str>) -> Result<(), CliError> {
    with_client(url, async |client| {
        let users = match name {
            Some(name) => client.users().list_by_name(name).await?,
            None => client.users().list_all().await?,
        };
        output.records(&users)
    })
    .await
}
