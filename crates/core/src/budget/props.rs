//! Property-based tests for budget figure derivation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::figures::BudgetFigures;
use super::types::{BudgetHealth, UtilizationStatus};

/// Strategy for a monetary amount with two fractional digits.
fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a gross amount at least the budget floor.
fn gross() -> impl Strategy<Value = Decimal> {
    (100_000i64..10_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// The remaining amount is always exactly gross minus expenses.
    #[test]
    fn prop_remaining_is_gross_minus_expenses(g in gross(), spent in money()) {
        let figures = BudgetFigures::compute(g, spent);
        prop_assert_eq!(figures.amount_remaining, g - spent);
    }

    /// Consumption and remaining percentages always sum to 100.
    #[test]
    fn prop_percentages_sum_to_one_hundred(g in gross(), spent in money()) {
        let figures = BudgetFigures::compute(g, spent);
        prop_assert_eq!(
            figures.consumption_percentage + figures.remaining_percentage,
            Decimal::ONE_HUNDRED
        );
    }

    /// An overdrawn budget always reads over budget and exceeded, and
    /// a non-overdrawn one never does.
    #[test]
    fn prop_overdrawn_classification(g in gross(), spent in money()) {
        let figures = BudgetFigures::compute(g, spent);
        if spent > g {
            prop_assert_eq!(figures.health, BudgetHealth::OverBudget);
            prop_assert_eq!(figures.utilization, UtilizationStatus::Exceeded);
            prop_assert!(figures.is_overbudget());
        } else {
            prop_assert_ne!(figures.health, BudgetHealth::OverBudget);
            prop_assert_ne!(figures.utilization, UtilizationStatus::Exceeded);
            prop_assert!(!figures.is_overbudget());
        }
    }

    /// Health thresholds follow the consumption percentage whenever the
    /// budget is not overdrawn.
    #[test]
    fn prop_health_matches_consumption(g in gross(), spent in money()) {
        let figures = BudgetFigures::compute(g, spent);
        if !figures.is_overbudget() {
            let expected = if figures.consumption_percentage >= Decimal::from(80) {
                BudgetHealth::NearLimit
            } else if figures.consumption_percentage >= Decimal::from(50) {
                BudgetHealth::Moderate
            } else {
                BudgetHealth::Healthy
            };
            prop_assert_eq!(figures.health, expected);
        }
    }

    /// Fully consumed means remaining at or below zero, and the
    /// utilization bucket agrees.
    #[test]
    fn prop_fully_consumed_matches_remaining(g in gross(), spent in money()) {
        let figures = BudgetFigures::compute(g, spent);
        prop_assert_eq!(figures.is_fully_consumed(), figures.amount_remaining <= Decimal::ZERO);
        if figures.amount_remaining.is_zero() {
            prop_assert_eq!(figures.utilization, UtilizationStatus::FullyUtilized);
        }
    }

    /// Recomputing from the same inputs yields identical figures.
    #[test]
    fn prop_recomputation_is_stable(g in gross(), spent in money()) {
        let first = BudgetFigures::compute(g, spent);
        let second = BudgetFigures::compute(g, spent);
        prop_assert_eq!(first.amount_remaining, second.amount_remaining);
        prop_assert_eq!(first.consumption_percentage, second.consumption_percentage);
        prop_assert_eq!(first.health, second.health);
        prop_assert_eq!(first.utilization, second.utilization);
    }
}
