//! Unit tests for invoice figure derivation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::figures::InvoiceFigures;
use super::types::PaymentStatus;

#[test]
fn test_fresh_invoice_with_tax() {
    let figures = InvoiceFigures::compute(dec!(1000), dec!(10), Decimal::ZERO, Decimal::ZERO);

    assert_eq!(figures.tax_amount, dec!(100));
    assert_eq!(figures.discount_amount, Decimal::ZERO);
    assert_eq!(figures.total_invoice_amount, dec!(1100));
    assert_eq!(figures.net_amount_due, dec!(1100));
    assert_eq!(figures.status, PaymentStatus::Unpaid);
}

#[test]
fn test_exact_payment_marks_paid() {
    let figures = InvoiceFigures::compute(dec!(1000), dec!(10), Decimal::ZERO, dec!(1100));

    assert_eq!(figures.net_amount_due, Decimal::ZERO);
    assert_eq!(figures.status, PaymentStatus::Paid);
    assert!(figures.is_fully_paid());
    assert!(!figures.is_overpaid());
}

#[test]
fn test_excess_payment_marks_over_paid() {
    let figures = InvoiceFigures::compute(dec!(1000), dec!(10), Decimal::ZERO, dec!(1150));

    assert_eq!(figures.net_amount_due, dec!(-50));
    assert_eq!(figures.status, PaymentStatus::OverPaid);
    assert!(figures.is_fully_paid());
    assert!(figures.is_overpaid());
}

#[test]
fn test_partial_payment_marks_partially_paid() {
    let figures = InvoiceFigures::compute(dec!(1000), dec!(10), Decimal::ZERO, dec!(600));

    assert_eq!(figures.net_amount_due, dec!(500));
    assert_eq!(figures.status, PaymentStatus::PartiallyPaid);
    assert!(!figures.is_fully_paid());
}

#[test]
fn test_discount_applies_after_tax() {
    let figures = InvoiceFigures::compute(dec!(1000), dec!(10), dec!(5), Decimal::ZERO);

    assert_eq!(figures.tax_amount, dec!(100));
    // 5% of 1100, not of 1000.
    assert_eq!(figures.discount_amount, dec!(55));
    assert_eq!(figures.total_invoice_amount, dec!(1045));
}

#[test]
fn test_zero_percentages_leave_gross_untouched() {
    let figures = InvoiceFigures::compute(dec!(2500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);

    assert_eq!(figures.tax_amount, Decimal::ZERO);
    assert_eq!(figures.discount_amount, Decimal::ZERO);
    assert_eq!(figures.total_invoice_amount, dec!(2500));
}

#[test]
fn test_negative_percentages_are_treated_as_zero() {
    let figures = InvoiceFigures::compute(dec!(2500), dec!(-10), dec!(-5), Decimal::ZERO);

    assert_eq!(figures.tax_amount, Decimal::ZERO);
    assert_eq!(figures.discount_amount, Decimal::ZERO);
    assert_eq!(figures.total_invoice_amount, dec!(2500));
}

#[test]
fn test_tax_rounds_to_two_decimal_places() {
    let figures = InvoiceFigures::compute(dec!(999.99), dec!(13), Decimal::ZERO, Decimal::ZERO);

    // 999.99 * 13% = 129.9987, rounded to 130.00.
    assert_eq!(figures.tax_amount, dec!(130.00));
    assert_eq!(figures.total_invoice_amount, dec!(1129.99));
}

#[test]
fn test_unpaid_regardless_of_total_when_no_payments() {
    let figures = InvoiceFigures::compute(dec!(500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);

    assert_eq!(figures.status, PaymentStatus::Unpaid);
    assert_eq!(figures.net_amount_due, dec!(500));
}

#[test]
fn test_full_discount_with_payment() {
    let figures = InvoiceFigures::compute(dec!(1000), Decimal::ZERO, dec!(100), Decimal::ZERO);

    assert_eq!(figures.discount_amount, dec!(1000));
    assert_eq!(figures.total_invoice_amount, Decimal::ZERO);
    // Nothing due, but no payments either, so the invoice stays unpaid.
    assert_eq!(figures.status, PaymentStatus::Unpaid);
}
