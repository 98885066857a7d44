//! Derived invoice figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::PaymentStatus;

/// Everything derivable from an invoice's stored financial fields and
/// its live payment sum.
///
/// Tax applies to the gross amount; the discount applies to gross plus
/// tax. Both round to two decimal places and are zero whenever their
/// percentage is zero or negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceFigures {
    /// Stored gross amount.
    pub gross_amount: Decimal,
    /// `gross_amount * tax_percent / 100`, or zero.
    pub tax_amount: Decimal,
    /// `(gross_amount + tax_amount) * discount_percent / 100`, or zero.
    pub discount_amount: Decimal,
    /// `gross_amount + tax_amount - discount_amount`.
    pub total_invoice_amount: Decimal,
    /// Sum of `amount_received` across the invoice's live payments.
    pub total_payments: Decimal,
    /// `total_invoice_amount - total_payments`. Negative when overpaid.
    pub net_amount_due: Decimal,
    /// Settlement status.
    pub status: PaymentStatus,
}

impl InvoiceFigures {
    /// Computes all derived figures from the stored financial fields and
    /// the live payment sum.
    #[must_use]
    pub fn compute(
        gross_amount: Decimal,
        tax_percent: Decimal,
        discount_percent: Decimal,
        total_payments: Decimal,
    ) -> Self {
        let tax_amount = if tax_percent <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            (gross_amount * tax_percent / Decimal::ONE_HUNDRED).round_dp(2)
        };
        let discount_amount = if discount_percent <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            ((gross_amount + tax_amount) * discount_percent / Decimal::ONE_HUNDRED).round_dp(2)
        };
        let total_invoice_amount = gross_amount + tax_amount - discount_amount;
        let net_amount_due = total_invoice_amount - total_payments;

        Self {
            gross_amount,
            tax_amount,
            discount_amount,
            total_invoice_amount,
            total_payments,
            net_amount_due,
            status: PaymentStatus::classify(total_payments, net_amount_due),
        }
    }

    /// True when the net amount due is at or below zero.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.net_amount_due <= Decimal::ZERO
    }

    /// True when payments exceed the invoice total.
    #[must_use]
    pub fn is_overpaid(&self) -> bool {
        self.net_amount_due < Decimal::ZERO
    }
}
