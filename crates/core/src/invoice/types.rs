//! Invoice classification types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement state of an invoice, derived from its live payments.
///
/// Never stored or patched directly: it is recomputed from the payment
/// sum on every read and after every payment mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No payments recorded.
    Unpaid,
    /// Payments cover part of the total.
    PartiallyPaid,
    /// Payments cover the total exactly.
    Paid,
    /// Payments exceed the total.
    OverPaid,
}

impl PaymentStatus {
    /// Classifies an invoice from its payment sum and net amount due.
    ///
    /// An invoice with no payments is unpaid regardless of its total.
    #[must_use]
    pub fn classify(total_payments: Decimal, net_amount_due: Decimal) -> Self {
        if total_payments.is_zero() {
            Self::Unpaid
        } else if net_amount_due < Decimal::ZERO {
            Self::OverPaid
        } else if net_amount_due.is_zero() {
            Self::Paid
        } else {
            Self::PartiallyPaid
        }
    }
}
