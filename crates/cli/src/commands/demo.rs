//! Walkthrough command.
//!
//! # Usage
//!
//! ```bash
//! # First run: create the records, then query them back
//! carlot demo --seed
//!
//! # Later runs: query a8m's cars and walk back to their owner
//! carlot demo
//! carlot demo --name a8m --all
//! ```

use carlot_core::Age;
use carlot_store::{DemoOptions, demo};

use super::{CliError, with_client};

/// Run the walkthrough for `name`.
///
/// # Errors
///
/// Returns `CliError::Demo` carrying the step that failed.
pub async fn run(
    url: Option<&str>,
    name: String,
    age: Age,
    seed: bool,
    model: Option<String>,
) -> Result<(), CliError> {
    let mut options = DemoOptions::new(name, age).with_model(model);
    options.seed = seed;

    with_client(url, async |client| {
        let report = demo::run(client, &options).await?;
        tracing::info!(
            user = %report.user,
            cars = report.cars.len(),
            owners = report.owners.len(),
            "Walkthrough complete"
        );
        Ok(())
    })
    .await
}
