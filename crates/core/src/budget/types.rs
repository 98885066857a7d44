//! Budget classification types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Health of a budget, derived from how much of it has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetHealth {
    /// Less than half of the allocation consumed.
    Healthy,
    /// Consumption at or above 50%.
    Moderate,
    /// Consumption at or above 80%.
    NearLimit,
    /// Expenses exceed the allocation.
    OverBudget,
}

impl BudgetHealth {
    /// Classifies a budget from its remaining amount and consumption percentage.
    #[must_use]
    pub fn classify(amount_remaining: Decimal, consumption_percentage: Decimal) -> Self {
        if amount_remaining < Decimal::ZERO {
            Self::OverBudget
        } else if consumption_percentage >= Decimal::from(80) {
            Self::NearLimit
        } else if consumption_percentage >= Decimal::from(50) {
            Self::Moderate
        } else {
            Self::Healthy
        }
    }
}

/// Utilization bucket reported on dashboards.
///
/// Finer-grained than [`BudgetHealth`]: it distinguishes an untouched
/// budget from a lightly used one, and an exactly exhausted budget from
/// an overdrawn one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UtilizationStatus {
    /// No expenses recorded yet.
    Unused,
    /// Consumption above 0% and below 50%.
    LowUtilization,
    /// Consumption at or above 50%.
    ModerateUtilization,
    /// Consumption at or above 80%.
    HighUtilization,
    /// Remaining amount is exactly zero.
    FullyUtilized,
    /// Expenses exceed the allocation.
    Exceeded,
}

impl UtilizationStatus {
    /// Classifies a budget from its remaining amount and consumption percentage.
    #[must_use]
    pub fn classify(amount_remaining: Decimal, consumption_percentage: Decimal) -> Self {
        if amount_remaining < Decimal::ZERO {
            Self::Exceeded
        } else if amount_remaining.is_zero() {
            Self::FullyUtilized
        } else if consumption_percentage >= Decimal::from(80) {
            Self::HighUtilization
        } else if consumption_percentage >= Decimal::from(50) {
            Self::ModerateUtilization
        } else if consumption_percentage > Decimal::ZERO {
            Self::LowUtilization
        } else {
            Self::Unused
        }
    }
}
