//! Positive line-item quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value was zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The value does not fit the remote API's count field.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
        /// Value that was rejected.
        got: i64,
    },
}

/// A cart quantity that is always at least 1.
///
/// Quantity updates are only ever sent as a `Quantity`, so a zero or
/// negative `count` cannot reach the remote API. Removing a line is a
/// separate operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest quantity accepted for a single line.
    pub const MAX: u32 = 9_999;

    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting values outside `1..=MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] when `value` is below 1 or above [`Self::MAX`].
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        let narrowed = u32::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .ok_or(QuantityError::TooLarge {
                max: Self::MAX,
                got: value,
            })?;
        NonZeroU32::new(narrowed)
            .map(Self)
            .ok_or(QuantityError::NotPositive(value))
    }

    /// Clamp arbitrary user input into `1..=MAX`.
    ///
    /// This is what stepper buttons use: decrementing past 1 stays at 1.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self::new(value.clamp(1, i64::from(Self::MAX))).unwrap_or(Self::ONE)
    }

    /// The quantity as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more unit, saturating at [`Self::MAX`].
    #[must_use]
    pub fn increment(self) -> Self {
        Self::clamped(i64::from(self.get()) + 1)
    }

    /// One fewer unit, never going below 1.
    #[must_use]
    pub fn decrement(self) -> Self {
        Self::clamped(i64::from(self.get()) - 1)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}
