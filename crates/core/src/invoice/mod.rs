//! Invoice totals and payment status derivation.
//!
//! An invoice's tax, discount, total and net amount due are functions of
//! its stored fields and the live payment sum. Nothing here is cached:
//! callers pass the current payment total and get every derived figure
//! back, including the settlement status.

pub mod figures;
pub mod types;

#[cfg(test)]
mod props;
#[cfg(test)]
mod tests;

pub use figures::InvoiceFigures;
pub use types::PaymentStatus;
