//! Property-based tests for the budget aggregation helpers.
//!
//! The repository never increments the stored remaining balance; it always
//! recomputes it from live expense rows through these helpers, so their
//! arithmetic carries the ledger invariant.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::entities::expenses;
use crate::repositories::budget::{BudgetOverview, remaining_after, total_spent};

/// Strategy for generating positive decimal amounts
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Creates a mock expense row with the given amount.
fn mock_expense(amount_spent: Decimal) -> expenses::Model {
    use chrono::Utc;
    use uuid::Uuid;

    expenses::Model {
        id: 1,
        uid: Uuid::new_v4(),
        serial_no: Some("EXP-26-0001".to_string()),
        title: "Office supplies".to_string(),
        description: "Printer paper and toner".to_string(),
        note: None,
        amount_spent,
        budget_uid: Uuid::new_v4(),
        category_uid: Uuid::new_v4(),
        user_uid: Uuid::new_v4(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

/// Mocks a budget row whose stored remaining matches the given spend.
fn mock_budget(gross_amount: Decimal, spent: Decimal) -> crate::entities::budgets::Model {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::entities::sea_orm_active_enums::{BudgetAvailability, BudgetStatus};

    crate::entities::budgets::Model {
        id: 1,
        uid: Uuid::new_v4(),
        serial_no: Some("BUD-26-0001".to_string()),
        title: "Quarterly operations".to_string(),
        description: "Operational allocation".to_string(),
        gross_amount,
        amount_remaining: gross_amount - spent,
        status: BudgetStatus::Approved,
        availability: BudgetAvailability::Available,
        department_uid: Uuid::new_v4(),
        user_uid: Uuid::new_v4(),
        approver_uid: None,
        assignee_uid: None,
        received_at: Utc::now().into(),
        approved_at: None,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: total spend is additive across expense rows**
    ///
    /// *For any* set of expenses, the total equals the sum of the
    /// individual amounts regardless of row order.
    #[test]
    fn prop_total_spent_additive(
        amount1 in amount_strategy(),
        amount2 in amount_strategy(),
        amount3 in amount_strategy(),
    ) {
        let rows = vec![
            mock_expense(amount1),
            mock_expense(amount2),
            mock_expense(amount3),
        ];
        let reversed: Vec<_> = rows.iter().rev().cloned().collect();

        prop_assert_eq!(total_spent(&rows), amount1 + amount2 + amount3);
        prop_assert_eq!(total_spent(&rows), total_spent(&reversed));
    }

    /// **Property: remaining plus spend reconstructs the gross amount**
    ///
    /// *For any* gross amount and expense set, remaining + total = gross.
    #[test]
    fn prop_remaining_reconstructs_gross(
        gross in amount_strategy(),
        amount1 in amount_strategy(),
        amount2 in amount_strategy(),
    ) {
        let rows = vec![mock_expense(amount1), mock_expense(amount2)];
        let remaining = remaining_after(gross, &rows);

        prop_assert_eq!(remaining + total_spent(&rows), gross);
    }

    /// **Property: each added expense reduces remaining by its amount**
    ///
    /// *For any* expense appended to a set, the remaining balance drops
    /// by exactly that expense's amount.
    #[test]
    fn prop_remaining_decreases_by_amount(
        gross in amount_strategy(),
        amount1 in amount_strategy(),
        amount2 in amount_strategy(),
    ) {
        let before = vec![mock_expense(amount1)];
        let mut after = before.clone();
        after.push(mock_expense(amount2));

        let delta = remaining_after(gross, &before) - remaining_after(gross, &after);
        prop_assert_eq!(delta, amount2);
    }

    /// **Property: overview figures agree with the aggregation helpers**
    ///
    /// *For any* budget and live total, the derived figures carry the
    /// same remaining balance the helpers compute.
    #[test]
    fn prop_overview_matches_helpers(
        gross in amount_strategy(),
        amount1 in amount_strategy(),
        amount2 in amount_strategy(),
    ) {
        let rows = vec![mock_expense(amount1), mock_expense(amount2)];
        let total = total_spent(&rows);
        let overview = BudgetOverview::from_live_total(mock_budget(gross, total), total);

        prop_assert_eq!(overview.figures.total_expenses, total);
        prop_assert_eq!(overview.figures.amount_remaining, remaining_after(gross, &rows));
        prop_assert_eq!(overview.figures.gross_amount, gross);
    }
}

// ============================================================================
// Unit Tests for Specific Examples
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_expenses_zero_total() {
        let rows: Vec<expenses::Model> = vec![];
        assert_eq!(total_spent(&rows), Decimal::ZERO);
    }

    #[test]
    fn test_remaining_with_no_expenses_is_gross() {
        let rows: Vec<expenses::Model> = vec![];
        assert_eq!(remaining_after(dec!(5000), &rows), dec!(5000));
    }

    #[test]
    fn test_total_sums_amounts() {
        let rows = vec![
            mock_expense(dec!(1200.50)),
            mock_expense(dec!(300)),
            mock_expense(dec!(99.49)),
        ];

        assert_eq!(total_spent(&rows), dec!(1599.99)); // 1200.50 + 300 + 99.49
    }

    #[test]
    fn test_remaining_after_partial_spend() {
        let rows = vec![mock_expense(dec!(1500)), mock_expense(dec!(2500))];

        assert_eq!(remaining_after(dec!(10000), &rows), dec!(6000)); // 10000 - 4000
    }

    #[test]
    fn test_remaining_negative_when_overdrawn() {
        // Writers that validated against stale state can leave the ledger
        // overdrawn; the aggregation must report it, not clamp it.
        let rows = vec![mock_expense(dec!(6000)), mock_expense(dec!(6000))];

        assert_eq!(remaining_after(dec!(10000), &rows), dec!(-2000));
    }

    #[test]
    fn test_overview_flags_overdrawn_budget() {
        let rows = vec![mock_expense(dec!(12000))];
        let total = total_spent(&rows);
        let overview = BudgetOverview::from_live_total(mock_budget(dec!(10000), total), total);

        assert!(overview.figures.is_overbudget());
        assert_eq!(overview.figures.amount_remaining, dec!(-2000));
    }

    #[test]
    fn test_overview_exact_consumption() {
        let rows = vec![mock_expense(dec!(2500))];
        let total = total_spent(&rows);
        let overview = BudgetOverview::from_live_total(mock_budget(dec!(10000), total), total);

        assert_eq!(overview.figures.consumption_percentage, dec!(25.00));
        assert_eq!(overview.figures.remaining_percentage, dec!(75.00));
    }
}
