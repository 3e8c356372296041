//! User domain types.

use core::fmt;

use serde::Serialize;

use carlot_core::{Age, CarId, UserId};

/// Name given to users created without one.
pub const DEFAULT_USER_NAME: &str = "unknown";

/// A stored user (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Store-generated ID.
    pub id: UserId,
    /// Display name; used as a lookup key but not unique.
    pub name: String,
    /// Age in years.
    pub age: Age,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User(id={}, age={}, name={})", self.id, self.age, self.name)
    }
}

/// A user waiting to be inserted.
///
/// Cars listed with [`NewUser::with_cars`] must exist and be unowned; they
/// are linked to the user in the same transaction as the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: Option<String>,
    age: Age,
    cars: Vec<CarId>,
}

impl NewUser {
    /// A named user.
    #[must_use]
    pub fn new(name: impl Into<String>, age: Age) -> Self {
        Self {
            name: Some(name.into()),
            age,
            cars: Vec::new(),
        }
    }

    /// A user that will be stored under [`DEFAULT_USER_NAME`].
    #[must_use]
    pub const fn unnamed(age: Age) -> Self {
        Self {
            name: None,
            age,
            cars: Vec::new(),
        }
    }

    /// Link existing cars to the user on insert.
    #[must_use]
    pub fn with_cars(mut self, cars: impl IntoIterator<Item = CarId>) -> Self {
        self.cars.extend(cars);
        self
    }

    /// The name that will be stored.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_USER_NAME)
    }

    /// The age that will be stored.
    #[must_use]
    pub const fn age(&self) -> Age {
        self.age
    }

    /// Cars to link on insert.
    #[must_use]
    pub fn cars(&self) -> &[CarId] {
        &self.cars
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let user = User {
            id: UserId::new(1),
            name: "a8m".to_string(),
            age: Age::new(30).unwrap(),
        };
        assert_eq!(user.to_string(), "User(id=1, age=30, name=a8m)");
    }

    #[test]
    fn test_unnamed_uses_default_name() {
        let user = NewUser::unnamed(Age::new(5).unwrap());
        assert_eq!(user.name(), DEFAULT_USER_NAME);
    }

    #[test]
    fn test_with_cars_accumulates() {
        let user = NewUser::new("a8m", Age::new(30).unwrap())
            .with_cars([CarId::new(1)])
            .with_cars([CarId::new(2)]);
        assert_eq!(user.cars(), &[CarId::new(1), CarId::new(2)]);
        assert_eq!(user.name(), "a8m");
    }
}
