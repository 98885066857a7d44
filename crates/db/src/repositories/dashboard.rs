//! Dashboard repository for administrative reporting queries.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{budgets, departments, expenses};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Reporting range could not be resolved to calendar months.
    #[error("Invalid reporting range")]
    InvalidRange,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A lookback window of whole calendar months.
///
/// The window ends with `end_month`/`end_year` (defaulting to the current
/// month) and reaches back `months` months inclusive, so `months = 1`
/// covers just the end month itself.
#[derive(Debug, Clone, Copy)]
pub struct UtilizationRange {
    /// Number of calendar months covered, ending with the end month.
    pub months: u32,
    /// Last month of the window (1-12); defaults to the current month.
    pub end_month: Option<u32>,
    /// Year of the last month; defaults to the current year.
    pub end_year: Option<i32>,
}

impl UtilizationRange {
    /// Resolves the window to a half-open `[start, end)` timestamp pair.
    ///
    /// Returns `None` when `months` is zero or the end month falls
    /// outside 1-12.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.months == 0 {
            return None;
        }
        let end_year = self.end_year.unwrap_or_else(|| now.year());
        let end_month = self.end_month.unwrap_or_else(|| now.month());
        if !(1..=12).contains(&end_month) {
            return None;
        }

        // Months since year zero, 1-based, so subtraction can cross years.
        let end_total = i64::from(end_year) * 12 + i64::from(end_month);
        let start_total = end_total - i64::from(self.months) + 1;

        Some((month_start(start_total)?, month_start(end_total + 1)?))
    }
}

/// First instant of the month addressed by a months-since-year-zero count.
fn month_start(total: i64) -> Option<DateTime<Utc>> {
    let year = i32::try_from((total - 1).div_euclid(12)).ok()?;
    let month = u32::try_from((total - 1).rem_euclid(12) + 1).ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Per-department budget consumption within a reporting window.
#[derive(Debug, Clone)]
pub struct DepartmentUtilization {
    /// Department uid.
    pub department_uid: Uuid,
    /// Department name.
    pub department_name: String,
    /// Sum of gross amounts of budgets created in the window.
    pub total_budget: Decimal,
    /// Sum of expense amounts recorded in the window.
    pub total_expenses: Decimal,
    /// Expenses as a percentage of budget, zero when no budget.
    pub utilization_percentage: Decimal,
    /// Budget total minus expense total.
    pub remaining_budget: Decimal,
}

/// Dashboard repository for reporting queries.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Budget and expense totals per department within the window,
    /// ordered by department name.
    ///
    /// Budgets count toward the window by their own creation time;
    /// expenses likewise, attributed to the department of their parent
    /// budget even when that budget predates the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or a query fails.
    pub async fn budget_utilization_by_department(
        &self,
        range: &UtilizationRange,
    ) -> Result<Vec<DepartmentUtilization>, DashboardError> {
        let (start, end) = range
            .resolve(Utc::now())
            .ok_or(DashboardError::InvalidRange)?;

        let department_rows = departments::Entity::find()
            .order_by_asc(departments::Column::Name)
            .all(&self.db)
            .await?;

        // Full map so out-of-window parents still attribute their expenses.
        let all_budgets = budgets::Entity::find().all(&self.db).await?;
        let budget_department: HashMap<Uuid, Uuid> = all_budgets
            .iter()
            .map(|b| (b.uid, b.department_uid))
            .collect();

        let mut budget_totals: HashMap<Uuid, Decimal> = HashMap::new();
        for budget in &all_budgets {
            if budget.created_at >= start && budget.created_at < end {
                *budget_totals
                    .entry(budget.department_uid)
                    .or_insert(Decimal::ZERO) += budget.gross_amount;
            }
        }

        let expense_rows = expenses::Entity::find()
            .filter(expenses::Column::CreatedAt.gte(start))
            .filter(expenses::Column::CreatedAt.lt(end))
            .all(&self.db)
            .await?;

        let mut expense_totals: HashMap<Uuid, Decimal> = HashMap::new();
        for expense in &expense_rows {
            if let Some(department_uid) = budget_department.get(&expense.budget_uid) {
                *expense_totals.entry(*department_uid).or_insert(Decimal::ZERO) +=
                    expense.amount_spent;
            }
        }

        let result = department_rows
            .into_iter()
            .map(|department| {
                let total_budget = budget_totals
                    .get(&department.uid)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let total_expenses = expense_totals
                    .get(&department.uid)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let utilization_percentage = if total_budget.is_zero() {
                    Decimal::ZERO
                } else {
                    (total_expenses / total_budget * Decimal::ONE_HUNDRED).round_dp(2)
                };

                DepartmentUtilization {
                    department_uid: department.uid,
                    department_name: department.name,
                    total_budget,
                    total_expenses,
                    utilization_percentage,
                    remaining_budget: total_budget - total_expenses,
                }
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_single_month_window_covers_that_month() {
        let range = UtilizationRange {
            months: 1,
            end_month: Some(8),
            end_year: Some(2026),
        };
        let (start, end) = range.resolve(at(2026, 8)).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).single().unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single().unwrap());
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let range = UtilizationRange {
            months: 3,
            end_month: Some(1),
            end_year: Some(2026),
        };
        let (start, end) = range.resolve(at(2026, 1)).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).single().unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single().unwrap());
    }

    #[test]
    fn test_defaults_to_current_month() {
        let range = UtilizationRange {
            months: 6,
            end_month: None,
            end_year: None,
        };
        let (start, end) = range.resolve(at(2026, 8)).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single().unwrap());
    }

    #[test]
    fn test_rejects_degenerate_ranges() {
        let zero_months = UtilizationRange {
            months: 0,
            end_month: Some(8),
            end_year: Some(2026),
        };
        let bad_month = UtilizationRange {
            months: 3,
            end_month: Some(13),
            end_year: Some(2026),
        };

        assert!(zero_months.resolve(at(2026, 8)).is_none());
        assert!(bad_month.resolve(at(2026, 8)).is_none());
    }
}
