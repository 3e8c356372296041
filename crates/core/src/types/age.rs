//! User age type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing an [`Age`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AgeError {
    /// The value is zero or negative.
    #[error("age must be positive (got {0})")]
    NotPositive(i64),
    /// The input string is not an integer.
    #[error("age must be an integer (got {0:?})")]
    NotANumber(String),
}

/// A user's age in years.
///
/// ## Constraints
///
/// - Strictly positive
///
/// ## Examples
///
/// ```
/// use carlot_core::Age;
///
/// assert_eq!(Age::new(30).unwrap().get(), 30);
/// assert!(Age::new(0).is_err());
/// assert!(Age::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Age(i64);

impl Age {
    /// Create an `Age`, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns `AgeError::NotPositive` if `years` is not greater than zero.
    pub fn new(years: i64) -> Result<Self, AgeError> {
        if years <= 0 {
            return Err(AgeError::NotPositive(years));
        }
        Ok(Self(years))
    }

    /// Returns the age in years.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Age {
    type Err = AgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let years = s
            .trim()
            .parse::<i64>()
            .map_err(|_| AgeError::NotANumber(s.to_owned()))?;
        Self::new(years)
    }
}

impl TryFrom<i64> for Age {
    type Error = AgeError;

    fn try_from(years: i64) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<Age> for i64 {
    fn from(age: Age) -> Self {
        age.0
    }
}
