//! Budget consumption arithmetic and classification.
//!
//! A budget allocates a gross amount to a department; expenses consume
//! it. Everything derived from that pair (remaining amount, consumption
//! percentage, health and utilization buckets) is computed here from the
//! gross amount and the live expense sum, never from a cached counter.

pub mod figures;
pub mod types;

#[cfg(test)]
mod props;
#[cfg(test)]
mod tests;

pub use figures::BudgetFigures;
pub use types::{BudgetHealth, UtilizationStatus};
