//! Carlot Store - database client for users and their cars.
//!
//! This crate owns everything that touches the database:
//! - connection configuration (URL or driver + DSN)
//! - the [`Client`] handle with its connection pool
//! - schema creation for `MySQL` and `SQLite`
//! - user and car repositories, including both directions of ownership
//! - the [`demo`] walkthrough run by `carlot demo`
//!
//! # Example
//!
//! ```rust,ignore
//! use carlot_store::{Client, DatabaseConfig, demo};
//!
//! let config = DatabaseConfig::from_env()?;
//! let client = Client::connect(&config).await?;
//! client.create_schema().await?;
//! let user = demo::query_user(&client, "a8m").await?;
//! client.close().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod demo;
pub mod dsn;
pub mod models;

pub use config::{ConfigError, DatabaseConfig};
pub use db::{CarRepository, Client, RepositoryError, SchemaError, UserRepository};
pub use demo::{DemoError, DemoOptions, DemoReport};
pub use dsn::{DatabaseUrl, Driver, DsnError};
pub use models::{Car, DEFAULT_USER_NAME, NewCar, NewUser, User};
