//! Car domain types.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use carlot_core::{CarId, UserId};

/// `Mon Jan  2 15:04:05 2006`
const REGISTERED_AT_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A stored car (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Car {
    /// Store-generated ID.
    pub id: CarId,
    /// Model name (e.g., "Tesla", "Ford").
    pub model: String,
    /// When the car was registered.
    pub registered_at: DateTime<Utc>,
    /// Owning user, if the car has been linked to one.
    pub owner_id: Option<UserId>,
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Car(id={}, model={}, registered_at={})",
            self.id,
            self.model,
            self.registered_at.format(REGISTERED_AT_FORMAT)
        )
    }
}

/// A car waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    model: String,
    registered_at: DateTime<Utc>,
    owner: Option<UserId>,
}

impl NewCar {
    /// A car registered at `registered_at`, without an owner.
    #[must_use]
    pub fn new(model: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            model: model.into(),
            registered_at,
            owner: None,
        }
    }

    /// A car registered now, without an owner.
    #[must_use]
    pub fn registered_now(model: impl Into<String>) -> Self {
        Self::new(model, Utc::now())
    }

    /// Set the owner at creation time.
    #[must_use]
    pub const fn owned_by(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// The model that will be stored.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The registration time that will be stored.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// The owner that will be stored, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<UserId> {
        self.owner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_display() {
        let car = Car {
            id: CarId::new(2),
            model: "Ford".to_string(),
            registered_at: Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap(),
            owner_id: None,
        };
        assert_eq!(
            car.to_string(),
            "Car(id=2, model=Ford, registered_at=Mon Jan  2 15:04:05 2006)"
        );
    }

    #[test]
    fn test_owned_by() {
        let car = NewCar::registered_now("Tesla").owned_by(UserId::new(4));
        assert_eq!(car.owner(), Some(UserId::new(4)));
        assert_eq!(car.model(), "Tesla");
    }
}
