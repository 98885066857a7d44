//! Unit tests for budget figure derivation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::figures::BudgetFigures;
use super::types::{BudgetHealth, UtilizationStatus};

#[test]
fn test_healthy_budget() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(3000));

    assert_eq!(figures.amount_remaining, dec!(7000));
    assert_eq!(figures.consumption_percentage, dec!(30));
    assert_eq!(figures.remaining_percentage, dec!(70));
    assert_eq!(figures.health, BudgetHealth::Healthy);
    assert_eq!(figures.utilization, UtilizationStatus::LowUtilization);
    assert!(!figures.is_fully_consumed());
    assert!(!figures.is_overbudget());
    assert!(!figures.is_near_limit());
}

#[test]
fn test_near_limit_budget() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(8500));

    assert_eq!(figures.amount_remaining, dec!(1500));
    assert_eq!(figures.consumption_percentage, dec!(85));
    assert_eq!(figures.health, BudgetHealth::NearLimit);
    assert_eq!(figures.utilization, UtilizationStatus::HighUtilization);
    assert!(figures.is_near_limit());
    assert!(!figures.is_overbudget());
}

#[test]
fn test_moderate_at_fifty_percent() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(5000));

    assert_eq!(figures.health, BudgetHealth::Moderate);
    assert_eq!(figures.utilization, UtilizationStatus::ModerateUtilization);
}

#[test]
fn test_healthy_just_below_fifty_percent() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(4999));

    assert_eq!(figures.consumption_percentage, dec!(49.99));
    assert_eq!(figures.health, BudgetHealth::Healthy);
}

#[test]
fn test_near_limit_at_eighty_percent() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(8000));

    assert_eq!(figures.health, BudgetHealth::NearLimit);
    assert_eq!(figures.utilization, UtilizationStatus::HighUtilization);
}

#[test]
fn test_untouched_budget_is_unused() {
    let figures = BudgetFigures::compute(dec!(10000), Decimal::ZERO);

    assert_eq!(figures.amount_remaining, dec!(10000));
    assert_eq!(figures.consumption_percentage, Decimal::ZERO);
    assert_eq!(figures.remaining_percentage, dec!(100));
    assert_eq!(figures.health, BudgetHealth::Healthy);
    assert_eq!(figures.utilization, UtilizationStatus::Unused);
}

#[test]
fn test_exactly_exhausted_budget() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(10000));

    assert_eq!(figures.amount_remaining, Decimal::ZERO);
    assert_eq!(figures.consumption_percentage, dec!(100));
    assert_eq!(figures.health, BudgetHealth::NearLimit);
    assert_eq!(figures.utilization, UtilizationStatus::FullyUtilized);
    assert!(figures.is_fully_consumed());
    assert!(!figures.is_overbudget());
}

#[test]
fn test_overdrawn_budget() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(12000));

    assert_eq!(figures.amount_remaining, dec!(-2000));
    assert_eq!(figures.consumption_percentage, dec!(120));
    assert_eq!(figures.health, BudgetHealth::OverBudget);
    assert_eq!(figures.utilization, UtilizationStatus::Exceeded);
    assert!(figures.is_fully_consumed());
    assert!(figures.is_overbudget());
}

#[test]
fn test_zero_gross_has_zero_consumption() {
    let figures = BudgetFigures::compute(Decimal::ZERO, Decimal::ZERO);

    assert_eq!(figures.consumption_percentage, Decimal::ZERO);
    assert_eq!(figures.health, BudgetHealth::Healthy);
    // Remaining is exactly zero, so utilization reads as fully utilized.
    assert_eq!(figures.utilization, UtilizationStatus::FullyUtilized);
}

#[test]
fn test_consumption_rounds_to_two_decimal_places() {
    let figures = BudgetFigures::compute(dec!(10000), dec!(3333.33));

    assert_eq!(figures.consumption_percentage, dec!(33.33));
    assert_eq!(figures.remaining_percentage, dec!(66.67));
}

#[test]
fn test_fractional_amounts_remain_exact() {
    let figures = BudgetFigures::compute(dec!(1000.50), dec!(250.25));

    assert_eq!(figures.amount_remaining, dec!(750.25));
    assert_eq!(figures.consumption_percentage, dec!(25.01));
}
