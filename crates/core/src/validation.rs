//! Monetary input guards shared by the ledger write paths.
//!
//! These run before any row is written; the database carries matching
//! CHECK constraints as a second line of defense.

use rust_decimal::Decimal;
use thiserror::Error;

/// Violation of a monetary input rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amounts must be strictly positive.
    #[error("amount must be greater than zero")]
    AmountNotPositive,

    /// Amounts must not be negative.
    #[error("amount must not be negative")]
    AmountNegative,

    /// Budget allocations have a floor.
    #[error("gross amount must be at least {minimum}")]
    GrossBelowMinimum {
        /// The enforced minimum.
        minimum: Decimal,
    },

    /// Percentages live in [0, 100].
    #[error("percentage must be between 0 and 100")]
    PercentOutOfRange,
}

/// Minimum gross amount accepted for a budget allocation.
#[must_use]
pub fn minimum_budget_gross() -> Decimal {
    Decimal::from(1000)
}

/// Requires a strictly positive amount.
///
/// # Errors
///
/// Returns `ValidationError::AmountNotPositive` for zero or negative
/// amounts.
pub fn require_positive(amount: Decimal) -> Result<(), ValidationError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::AmountNotPositive)
    }
}

/// Requires a zero-or-positive amount.
///
/// # Errors
///
/// Returns `ValidationError::AmountNegative` for negative amounts.
pub fn require_nonnegative(amount: Decimal) -> Result<(), ValidationError> {
    if amount >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::AmountNegative)
    }
}

/// Requires a budget gross amount at or above the floor.
///
/// # Errors
///
/// Returns `ValidationError::GrossBelowMinimum` for amounts below the
/// floor.
pub fn require_budget_gross(amount: Decimal) -> Result<(), ValidationError> {
    let minimum = minimum_budget_gross();
    if amount >= minimum {
        Ok(())
    } else {
        Err(ValidationError::GrossBelowMinimum { minimum })
    }
}

/// Requires a percentage in [0, 100].
///
/// # Errors
///
/// Returns `ValidationError::PercentOutOfRange` for values outside the
/// range.
pub fn require_percentage(percent: Decimal) -> Result<(), ValidationError> {
    if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&percent) {
        Ok(())
    } else {
        Err(ValidationError::PercentOutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_positive_amounts_pass() {
        assert!(require_positive(dec!(0.01)).is_ok());
        assert!(require_positive(dec!(3000)).is_ok());
    }

    #[test]
    fn test_zero_and_negative_amounts_fail() {
        assert_eq!(
            require_positive(Decimal::ZERO),
            Err(ValidationError::AmountNotPositive)
        );
        assert_eq!(
            require_positive(dec!(-5)),
            Err(ValidationError::AmountNotPositive)
        );
    }

    #[test]
    fn test_nonnegative_allows_zero() {
        assert!(require_nonnegative(Decimal::ZERO).is_ok());
        assert!(require_nonnegative(dec!(250)).is_ok());
        assert_eq!(
            require_nonnegative(dec!(-0.01)),
            Err(ValidationError::AmountNegative)
        );
    }

    #[test]
    fn test_budget_gross_floor_boundary() {
        assert!(require_budget_gross(dec!(1000)).is_ok());
        assert_eq!(
            require_budget_gross(dec!(999)),
            Err(ValidationError::GrossBelowMinimum {
                minimum: dec!(1000)
            })
        );
    }

    #[test]
    fn test_percentage_range() {
        assert!(require_percentage(Decimal::ZERO).is_ok());
        assert!(require_percentage(dec!(50)).is_ok());
        assert!(require_percentage(dec!(100)).is_ok());
        assert_eq!(
            require_percentage(dec!(-1)),
            Err(ValidationError::PercentOutOfRange)
        );
        assert_eq!(
            require_percentage(dec!(100.01)),
            Err(ValidationError::PercentOutOfRange)
        );
    }
}
