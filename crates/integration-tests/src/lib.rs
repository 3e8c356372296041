//! Integration tests for carlot.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p carlot-integration-tests
//! ```
//!
//! Every test opens its own in-memory `SQLite` database, so tests neither
//! need a running server nor see each other's rows.
//!
//! # Test Categories
//!
//! - `users` - user inserts and exactly-one lookups
//! - `cars` - car inserts, ownership links in both directions
//! - `demo` - the full walkthrough and client shutdown

#![allow(clippy::expect_used)]

use carlot_core::Age;
use carlot_store::{Client, DatabaseConfig, DatabaseUrl};

/// Connection URL for a private in-memory database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// Open a client on a fresh in-memory database with the schema applied.
///
/// # Panics
///
/// Panics if the database cannot be opened or the schema cannot be created.
pub async fn memory_client() -> Client {
    let url = DatabaseUrl::parse(MEMORY_URL).expect("in-memory URL is valid");
    let client = Client::connect(&DatabaseConfig::new(url))
        .await
        .expect("Failed to open in-memory database");
    client
        .create_schema()
        .await
        .expect("Failed to create schema");
    client
}

/// Shorthand for a valid age.
///
/// # Panics
///
/// Panics if `years` is not positive.
#[must_use]
pub fn age(years: i64) -> Age {
    Age::new(years).expect("test age is positive")
}
