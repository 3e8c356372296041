//! Core types for carlot.
//!
//! This module provides type-safe wrappers for the entity ids and the
//! validated user fields.

pub mod age;
pub mod id;

pub use age::{Age, AgeError};
pub use id::*;
