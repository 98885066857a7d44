//! Derived budget figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{BudgetHealth, UtilizationStatus};

/// Everything derivable from a budget's gross amount and its live
/// expense sum.
///
/// Computed in one place so that every read and every post-mutation
/// recomputation agree on the arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetFigures {
    /// Allocated gross amount.
    pub gross_amount: Decimal,
    /// Sum of `amount_spent` across the budget's live expenses.
    pub total_expenses: Decimal,
    /// Gross amount minus total expenses. Negative when overdrawn.
    pub amount_remaining: Decimal,
    /// Expenses as a percentage of gross, rounded to two decimal places.
    /// Zero when the gross amount is zero.
    pub consumption_percentage: Decimal,
    /// `100 - consumption_percentage`. Negative when overdrawn.
    pub remaining_percentage: Decimal,
    /// Health classification.
    pub health: BudgetHealth,
    /// Utilization bucket.
    pub utilization: UtilizationStatus,
}

impl BudgetFigures {
    /// Computes all derived figures from the gross amount and the live
    /// expense sum.
    #[must_use]
    pub fn compute(gross_amount: Decimal, total_expenses: Decimal) -> Self {
        let amount_remaining = gross_amount - total_expenses;
        let consumption_percentage = if gross_amount.is_zero() {
            Decimal::ZERO
        } else {
            (total_expenses / gross_amount * Decimal::ONE_HUNDRED).round_dp(2)
        };
        let remaining_percentage = Decimal::ONE_HUNDRED - consumption_percentage;

        Self {
            gross_amount,
            total_expenses,
            amount_remaining,
            consumption_percentage,
            remaining_percentage,
            health: BudgetHealth::classify(amount_remaining, consumption_percentage),
            utilization: UtilizationStatus::classify(amount_remaining, consumption_percentage),
        }
    }

    /// True when no headroom remains (remaining amount at or below zero).
    #[must_use]
    pub fn is_fully_consumed(&self) -> bool {
        self.amount_remaining <= Decimal::ZERO
    }

    /// True when expenses exceed the allocation.
    #[must_use]
    pub fn is_overbudget(&self) -> bool {
        self.amount_remaining < Decimal::ZERO
    }

    /// True when consumption has reached 80% of the allocation.
    #[must_use]
    pub fn is_near_limit(&self) -> bool {
        self.consumption_percentage >= Decimal::from(80)
    }
}
