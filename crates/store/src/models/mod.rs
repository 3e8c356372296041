//! Domain types for users and cars.
//!
//! These types represent validated records as returned by the repositories,
//! plus the builders used to insert new ones.

pub mod car;
pub mod user;

pub use car::{Car, NewCar};
pub use user::{DEFAULT_USER_NAME, NewUser, User};
