//! Carlot Core - Shared types library.
//!
//! This crate provides the types shared by the carlot components:
//! - `store` - Database client, schema and repositories for users and cars
//! - `cli` - Command-line entry point (migrations, demo script, record commands)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Database
//! encoding for the ids is opt-in through the `sqlx` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and validated field values

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
