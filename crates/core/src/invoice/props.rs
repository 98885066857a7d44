//! Property-based tests for invoice figure derivation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::figures::InvoiceFigures;
use super::types::PaymentStatus;

/// Strategy for a monetary amount with two fractional digits.
fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a percentage in [0, 100] with two fractional digits.
fn percentage() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|basis_points| Decimal::new(basis_points, 2))
}

proptest! {
    /// Net amount due is always total minus payments.
    #[test]
    fn prop_net_due_is_total_minus_payments(
        g in money(),
        tax in percentage(),
        disc in percentage(),
        paid in money(),
    ) {
        let figures = InvoiceFigures::compute(g, tax, disc, paid);
        prop_assert_eq!(
            figures.net_amount_due,
            figures.total_invoice_amount - figures.total_payments
        );
    }

    /// The invoice total is always gross plus tax minus discount.
    #[test]
    fn prop_total_composition(g in money(), tax in percentage(), disc in percentage()) {
        let figures = InvoiceFigures::compute(g, tax, disc, Decimal::ZERO);
        prop_assert_eq!(
            figures.total_invoice_amount,
            figures.gross_amount + figures.tax_amount - figures.discount_amount
        );
        prop_assert!(figures.tax_amount >= Decimal::ZERO);
        prop_assert!(figures.discount_amount >= Decimal::ZERO);
    }

    /// The status partition is exhaustive and mutually exclusive.
    #[test]
    fn prop_status_partition(
        g in money(),
        tax in percentage(),
        disc in percentage(),
        paid in money(),
    ) {
        let figures = InvoiceFigures::compute(g, tax, disc, paid);
        let expected = if paid.is_zero() {
            PaymentStatus::Unpaid
        } else if figures.net_amount_due < Decimal::ZERO {
            PaymentStatus::OverPaid
        } else if figures.net_amount_due.is_zero() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        };
        prop_assert_eq!(figures.status, expected);
    }

    /// Paying more never increases the net amount due.
    #[test]
    fn prop_payments_only_reduce_net_due(
        g in money(),
        tax in percentage(),
        disc in percentage(),
        paid in money(),
        extra in money(),
    ) {
        let before = InvoiceFigures::compute(g, tax, disc, paid);
        let after = InvoiceFigures::compute(g, tax, disc, paid + extra);
        prop_assert_eq!(after.net_amount_due, before.net_amount_due - extra);
        prop_assert!(after.net_amount_due <= before.net_amount_due);
    }

    /// Recomputing from the same inputs yields identical figures.
    #[test]
    fn prop_recomputation_is_stable(
        g in money(),
        tax in percentage(),
        disc in percentage(),
        paid in money(),
    ) {
        let first = InvoiceFigures::compute(g, tax, disc, paid);
        let second = InvoiceFigures::compute(g, tax, disc, paid);
        prop_assert_eq!(first.net_amount_due, second.net_amount_due);
        prop_assert_eq!(first.total_invoice_amount, second.total_invoice_amount);
        prop_assert_eq!(first.status, second.status);
    }
}
