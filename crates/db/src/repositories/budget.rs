//! Budget repository for the budget and expense ledger.
//!
//! A budget and its expenses form one aggregate. Every mutation of the
//! aggregate runs in a single transaction that takes the budget's advisory
//! lock before validating, and finishes by recomputing `amount_remaining`
//! from a fresh aggregate read of the live expense rows. The stored value
//! is only ever written from that sum; no code path increments it.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use curafin_core::budget::BudgetFigures;
use curafin_core::serial::{self, SerialKind};
use curafin_core::validation::{self, ValidationError};
use curafin_shared::types::PageRequest;

use crate::entities::{
    budgets, departments, expense_categories, expenses,
    sea_orm_active_enums::{BudgetAvailability, BudgetStatus, RecordStatus},
    users,
};
use crate::locks::{self, LockDomain};

use super::Caller;

/// Error types for budget ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),

    /// Department absent or inactive.
    #[error("Department not found or inactive: {0}")]
    DepartmentNotFound(Uuid),

    /// Expense category absent or inactive.
    #[error("Expense category not found or inactive: {0}")]
    CategoryNotFound(Uuid),

    /// Assignee user does not exist.
    #[error("Assignee not found: {0}")]
    AssigneeNotFound(Uuid),

    /// Caller does not own the row it is trying to change.
    #[error("Caller does not own this record")]
    NotOwner,

    /// Operation restricted to administrators.
    #[error("Administrator role required")]
    AdminOnly,

    /// Gross amount cannot shrink below the outstanding spend.
    #[error("Gross amount {gross} is below the outstanding spend {spent}")]
    GrossBelowSpend {
        /// Requested gross amount.
        gross: Decimal,
        /// Live total of expense amounts.
        spent: Decimal,
    },

    /// Expense amount exceeds the remaining allocation.
    #[error("Amount {requested} exceeds remaining budget {remaining}")]
    InsufficientRemaining {
        /// Requested expense amount.
        requested: Decimal,
        /// Remaining allocation at validation time.
        remaining: Decimal,
    },

    /// Amount failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Department receiving the allocation.
    pub department_uid: Uuid,
    /// Gross amount allocated (minimum 1000).
    pub gross_amount: Decimal,
    /// Budget title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// When the allocation was received; defaults to now.
    pub received_at: Option<DateTimeWithTimeZone>,
    /// Optional initial assignee.
    pub assignee_uid: Option<Uuid>,
}

/// Input for updating a budget. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New gross amount (must stay at or above the live spend).
    pub gross_amount: Option<Decimal>,
    /// New availability.
    pub availability: Option<BudgetAvailability>,
    /// New received-at timestamp.
    pub received_at: Option<DateTimeWithTimeZone>,
}

/// Input for recording an expense against a budget.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Category the spend belongs to.
    pub category_uid: Uuid,
    /// Amount spent (must be positive).
    pub amount_spent: Decimal,
    /// Expense title.
    pub title: String,
    /// Expense description.
    pub description: String,
    /// Optional free-form note.
    pub note: Option<String>,
}

/// Input for updating an expense. `None` fields are left untouched;
/// `note` uses a nested `Option` so the caller can clear it.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New note (`Some(None)` clears it).
    pub note: Option<Option<String>>,
    /// New amount (must be positive and fit the allocation).
    pub amount_spent: Option<Decimal>,
    /// New category.
    pub category_uid: Option<Uuid>,
}

/// Filter for listing budgets.
#[derive(Debug, Clone, Default)]
pub struct BudgetListFilter {
    /// Restrict to budgets owned by this user.
    pub owner_uid: Option<Uuid>,
    /// Restrict to budgets assigned to this user.
    pub assignee_uid: Option<Uuid>,
    /// Restrict to this approval status.
    pub status: Option<BudgetStatus>,
    /// Restrict to this availability.
    pub availability: Option<BudgetAvailability>,
    /// Case-insensitive search over title, description, and serial number.
    pub q: Option<String>,
}

/// A budget row paired with figures derived from its live expense total.
#[derive(Debug, Clone)]
pub struct BudgetOverview {
    /// The budget record.
    pub budget: budgets::Model,
    /// Derived consumption figures.
    pub figures: BudgetFigures,
}

impl BudgetOverview {
    /// Pairs a budget row with figures computed from the live expense total.
    #[must_use]
    pub fn from_live_total(budget: budgets::Model, total_expenses: Decimal) -> Self {
        let figures = BudgetFigures::compute(budget.gross_amount, total_expenses);
        Self { budget, figures }
    }
}

/// Budget repository for ledger operations.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Budget operations
    // ========================================================================

    /// Creates a budget and assigns its serial number in one transaction.
    ///
    /// Administrators create budgets pre-approved (approver and approval
    /// timestamp stamped); everyone else starts at `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The gross amount is below the 1000 minimum
    /// - The department does not exist or is inactive
    /// - The assignee does not exist
    /// - The database operation fails
    pub async fn create_budget(
        &self,
        caller: &Caller,
        input: CreateBudgetInput,
    ) -> Result<budgets::Model, BudgetError> {
        validation::require_budget_gross(input.gross_amount)?;

        let department = departments::Entity::find_by_id(input.department_uid)
            .filter(departments::Column::Status.eq(RecordStatus::Active))
            .one(&self.db)
            .await?
            .ok_or(BudgetError::DepartmentNotFound(input.department_uid))?;

        if let Some(assignee_uid) = input.assignee_uid {
            let _assignee = users::Entity::find_by_id(assignee_uid)
                .one(&self.db)
                .await?
                .ok_or(BudgetError::AssigneeNotFound(assignee_uid))?;
        }

        let now = Utc::now().into();
        let (status, approver_uid, approved_at) = if caller.admin {
            (BudgetStatus::Approved, Some(caller.user_uid), Some(now))
        } else {
            (BudgetStatus::Pending, None, None)
        };

        let txn = self.db.begin().await?;

        let budget = budgets::ActiveModel {
            id: NotSet,
            uid: Set(Uuid::new_v4()),
            serial_no: Set(None),
            title: Set(input.title),
            description: Set(input.description),
            gross_amount: Set(input.gross_amount),
            amount_remaining: Set(input.gross_amount),
            status: Set(status),
            availability: Set(BudgetAvailability::Available),
            department_uid: Set(department.uid),
            user_uid: Set(caller.user_uid),
            approver_uid: Set(approver_uid),
            assignee_uid: Set(input.assignee_uid),
            received_at: Set(input.received_at.unwrap_or(now)),
            approved_at: Set(approved_at),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = budget.insert(&txn).await?;

        let serial = serial::serial_no(SerialKind::Budget, Utc::now().year(), inserted.id);
        let mut with_serial: budgets::ActiveModel = inserted.into();
        with_serial.serial_no = Set(Some(serial));
        let budget = with_serial.update(&txn).await?;

        txn.commit().await?;
        Ok(budget)
    }

    /// Gets a budget by uid with figures derived from its live expenses.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found or the query fails.
    pub async fn get_budget(&self, budget_uid: Uuid) -> Result<BudgetOverview, BudgetError> {
        let budget = Self::budget_by_uid(&self.db, budget_uid).await?;
        let total = Self::live_expense_total(&self.db, budget.uid).await?;
        Ok(BudgetOverview::from_live_total(budget, total))
    }

    /// Lists budgets newest-first with live-derived figures per row.
    ///
    /// Returns the page of overviews plus the total row count for the
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_budgets(
        &self,
        filter: &BudgetListFilter,
        page: &PageRequest,
    ) -> Result<(Vec<BudgetOverview>, u64), BudgetError> {
        let mut query = budgets::Entity::find();

        if let Some(owner_uid) = filter.owner_uid {
            query = query.filter(budgets::Column::UserUid.eq(owner_uid));
        }
        if let Some(assignee_uid) = filter.assignee_uid {
            query = query.filter(budgets::Column::AssigneeUid.eq(assignee_uid));
        }
        if let Some(status) = filter.status.clone() {
            query = query.filter(budgets::Column::Status.eq(status));
        }
        if let Some(availability) = filter.availability.clone() {
            query = query.filter(budgets::Column::Availability.eq(availability));
        }
        if let Some(q) = filter.q.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(budgets::Column::Title.contains(q))
                    .add(budgets::Column::Description.contains(q))
                    .add(budgets::Column::SerialNo.contains(q)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(budgets::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(rows.len());
        for budget in rows {
            let spent = Self::live_expense_total(&self.db, budget.uid).await?;
            result.push(BudgetOverview::from_live_total(budget, spent));
        }

        Ok((result, total))
    }

    /// Updates a budget owned by the caller.
    ///
    /// A gross-amount change takes the aggregate lock, re-reads the live
    /// spend, and rejects any value below it; shrinking below outstanding
    /// spend is refused, never truncated. `amount_remaining` is recomputed
    /// from the fresh spend in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The budget is not found
    /// - The caller is not the owner
    /// - The new gross amount is below 1000 or below the live spend
    /// - The database operation fails
    pub async fn update_budget(
        &self,
        caller: &Caller,
        budget_uid: Uuid,
        input: UpdateBudgetInput,
    ) -> Result<budgets::Model, BudgetError> {
        if let Some(gross) = input.gross_amount {
            validation::require_budget_gross(gross)?;
        }

        let txn = self.db.begin().await?;

        let budget = Self::budget_by_uid(&txn, budget_uid).await?;
        if budget.user_uid != caller.user_uid {
            return Err(BudgetError::NotOwner);
        }

        let gross_patch = match input.gross_amount {
            Some(gross) => {
                locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
                let spent = Self::live_expense_total(&txn, budget.uid).await?;
                if gross < spent {
                    return Err(BudgetError::GrossBelowSpend { gross, spent });
                }
                Some((gross, gross - spent))
            }
            None => None,
        };

        let mut active: budgets::ActiveModel = budget.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(availability) = input.availability {
            active.availability = Set(availability);
        }
        if let Some(received_at) = input.received_at {
            active.received_at = Set(received_at);
        }
        if let Some((gross, remaining)) = gross_patch {
            active.gross_amount = Set(gross);
            active.amount_remaining = Set(remaining);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Sets the approval status of a budget. Administrators only.
    ///
    /// Approval stamps the caller as approver with the approval time;
    /// rejection stamps the caller and clears the approval time; resetting
    /// to pending clears both.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an administrator, the budget
    /// is not found, or the database operation fails.
    pub async fn set_status(
        &self,
        caller: &Caller,
        budget_uid: Uuid,
        status: BudgetStatus,
    ) -> Result<budgets::Model, BudgetError> {
        if !caller.admin {
            return Err(BudgetError::AdminOnly);
        }

        let budget = Self::budget_by_uid(&self.db, budget_uid).await?;

        let now = Utc::now().into();
        let mut active: budgets::ActiveModel = budget.into();
        match status {
            BudgetStatus::Approved => {
                active.approver_uid = Set(Some(caller.user_uid));
                active.approved_at = Set(Some(now));
            }
            BudgetStatus::Rejected => {
                active.approver_uid = Set(Some(caller.user_uid));
                active.approved_at = Set(None);
            }
            BudgetStatus::Pending => {
                active.approver_uid = Set(None);
                active.approved_at = Set(None);
            }
        }
        active.status = Set(status);
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Assigns a budget to a user, or clears the assignment.
    /// Administrators only.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an administrator, the budget
    /// or assignee is not found, or the database operation fails.
    pub async fn assign(
        &self,
        caller: &Caller,
        budget_uid: Uuid,
        assignee_uid: Option<Uuid>,
    ) -> Result<budgets::Model, BudgetError> {
        if !caller.admin {
            return Err(BudgetError::AdminOnly);
        }

        let budget = Self::budget_by_uid(&self.db, budget_uid).await?;

        if let Some(uid) = assignee_uid {
            let _assignee = users::Entity::find_by_id(uid)
                .one(&self.db)
                .await?
                .ok_or(BudgetError::AssigneeNotFound(uid))?;
        }

        let mut active: budgets::ActiveModel = budget.into();
        active.assignee_uid = Set(assignee_uid);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a budget owned by the caller together with all its expenses.
    ///
    /// The foreign key cascade removes the expense rows inside the same
    /// transaction; the aggregate lock keeps in-flight expense mutations
    /// from interleaving with the delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found, the caller is not the
    /// owner, or the database operation fails.
    pub async fn delete_budget(&self, caller: &Caller, budget_uid: Uuid) -> Result<(), BudgetError> {
        let txn = self.db.begin().await?;

        let budget = Self::budget_by_uid(&txn, budget_uid).await?;
        if budget.user_uid != caller.user_uid {
            return Err(BudgetError::NotOwner);
        }

        locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
        budgets::Entity::delete_by_id(budget.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Expense operations
    // ========================================================================

    /// Records an expense against a budget and assigns its serial number.
    ///
    /// Validation runs against the remaining allocation as read under the
    /// aggregate lock, so two concurrent inserts cannot both pass against
    /// the same stale value. After the insert, `amount_remaining` is
    /// recomputed from a fresh aggregate of all live expenses.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive
    /// - The budget is not found
    /// - The category does not exist or is inactive
    /// - The amount exceeds the remaining allocation
    /// - The database operation fails
    pub async fn add_expense(
        &self,
        caller: &Caller,
        budget_uid: Uuid,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, BudgetError> {
        validation::require_positive(input.amount_spent)?;

        let txn = self.db.begin().await?;

        let budget = Self::budget_by_uid(&txn, budget_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
        // State may have moved while waiting for the lock.
        let budget = Self::budget_by_uid(&txn, budget_uid).await?;

        let category = expense_categories::Entity::find_by_id(input.category_uid)
            .filter(expense_categories::Column::Status.eq(RecordStatus::Active))
            .one(&txn)
            .await?
            .ok_or(BudgetError::CategoryNotFound(input.category_uid))?;

        let live_total = Self::live_expense_total(&txn, budget.uid).await?;
        let remaining = budget.gross_amount - live_total;
        if input.amount_spent > remaining {
            return Err(BudgetError::InsufficientRemaining {
                requested: input.amount_spent,
                remaining,
            });
        }

        let now = Utc::now().into();
        let expense = expenses::ActiveModel {
            id: NotSet,
            uid: Set(Uuid::new_v4()),
            serial_no: Set(None),
            title: Set(input.title),
            description: Set(input.description),
            note: Set(input.note),
            amount_spent: Set(input.amount_spent),
            budget_uid: Set(budget.uid),
            category_uid: Set(category.uid),
            user_uid: Set(caller.user_uid),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = expense.insert(&txn).await?;

        let serial = serial::serial_no(SerialKind::Expense, Utc::now().year(), inserted.id);
        let mut with_serial: expenses::ActiveModel = inserted.into();
        with_serial.serial_no = Set(Some(serial));
        let expense = with_serial.update(&txn).await?;

        Self::store_remaining(&txn, budget).await?;

        txn.commit().await?;
        Ok(expense)
    }

    /// Gets an expense by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is not found or the query fails.
    pub async fn get_expense(&self, expense_uid: Uuid) -> Result<expenses::Model, BudgetError> {
        Self::expense_by_uid(&self.db, expense_uid).await
    }

    /// Lists the expenses of a budget newest-first.
    ///
    /// Returns the page of rows plus the total row count for the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found or the query fails.
    pub async fn list_expenses(
        &self,
        budget_uid: Uuid,
        q: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), BudgetError> {
        let _budget = Self::budget_by_uid(&self.db, budget_uid).await?;

        let mut query = expenses::Entity::find().filter(expenses::Column::BudgetUid.eq(budget_uid));
        if let Some(q) = q {
            query = query.filter(
                Condition::any()
                    .add(expenses::Column::Title.contains(q))
                    .add(expenses::Column::Description.contains(q))
                    .add(expenses::Column::SerialNo.contains(q)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates an expense created by the caller and recomputes the parent
    /// budget in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The expense or its budget is not found
    /// - The caller did not create the expense
    /// - The patched amount is not positive or overdraws the allocation
    /// - The new category does not exist or is inactive
    /// - The database operation fails
    pub async fn update_expense(
        &self,
        caller: &Caller,
        expense_uid: Uuid,
        input: UpdateExpenseInput,
    ) -> Result<expenses::Model, BudgetError> {
        if let Some(amount) = input.amount_spent {
            validation::require_positive(amount)?;
        }

        let txn = self.db.begin().await?;

        let expense = Self::expense_by_uid(&txn, expense_uid).await?;
        let budget = Self::budget_by_uid(&txn, expense.budget_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
        // State may have moved while waiting for the lock.
        let expense = Self::expense_by_uid(&txn, expense_uid).await?;
        let budget = Self::budget_by_uid(&txn, expense.budget_uid).await?;

        if expense.user_uid != caller.user_uid {
            return Err(BudgetError::NotOwner);
        }

        if let Some(category_uid) = input.category_uid {
            let _category = expense_categories::Entity::find_by_id(category_uid)
                .filter(expense_categories::Column::Status.eq(RecordStatus::Active))
                .one(&txn)
                .await?
                .ok_or(BudgetError::CategoryNotFound(category_uid))?;
        }

        if let Some(amount) = input.amount_spent {
            let live = Self::live_expenses(&txn, budget.uid).await?;
            let others = total_spent(&live) - expense.amount_spent;
            if others + amount > budget.gross_amount {
                return Err(BudgetError::InsufficientRemaining {
                    requested: amount,
                    remaining: budget.gross_amount - others,
                });
            }
        }

        let mut active: expenses::ActiveModel = expense.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(note) = input.note {
            active.note = Set(note);
        }
        if let Some(amount) = input.amount_spent {
            active.amount_spent = Set(amount);
        }
        if let Some(category_uid) = input.category_uid {
            active.category_uid = Set(category_uid);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        Self::store_remaining(&txn, budget).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an expense created by the caller and recomputes the parent
    /// budget in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense or its budget is not found, the
    /// caller did not create the expense, or the database operation fails.
    pub async fn delete_expense(
        &self,
        caller: &Caller,
        expense_uid: Uuid,
    ) -> Result<(), BudgetError> {
        let txn = self.db.begin().await?;

        let expense = Self::expense_by_uid(&txn, expense_uid).await?;
        let budget = Self::budget_by_uid(&txn, expense.budget_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
        // State may have moved while waiting for the lock.
        let expense = Self::expense_by_uid(&txn, expense_uid).await?;
        let budget = Self::budget_by_uid(&txn, expense.budget_uid).await?;

        if expense.user_uid != caller.user_uid {
            return Err(BudgetError::NotOwner);
        }

        expenses::Entity::delete_by_id(expense.id).exec(&txn).await?;

        Self::store_remaining(&txn, budget).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Fetches a budget by uid or reports it missing.
    async fn budget_by_uid<C: ConnectionTrait>(
        conn: &C,
        budget_uid: Uuid,
    ) -> Result<budgets::Model, BudgetError> {
        budgets::Entity::find()
            .filter(budgets::Column::Uid.eq(budget_uid))
            .one(conn)
            .await?
            .ok_or(BudgetError::NotFound(budget_uid))
    }

    /// Fetches an expense by uid or reports it missing.
    async fn expense_by_uid<C: ConnectionTrait>(
        conn: &C,
        expense_uid: Uuid,
    ) -> Result<expenses::Model, BudgetError> {
        expenses::Entity::find()
            .filter(expenses::Column::Uid.eq(expense_uid))
            .one(conn)
            .await?
            .ok_or(BudgetError::ExpenseNotFound(expense_uid))
    }

    /// Reads all live expense rows of a budget.
    async fn live_expenses<C: ConnectionTrait>(
        conn: &C,
        budget_uid: Uuid,
    ) -> Result<Vec<expenses::Model>, DbErr> {
        expenses::Entity::find()
            .filter(expenses::Column::BudgetUid.eq(budget_uid))
            .all(conn)
            .await
    }

    /// Sums the live expense rows of a budget.
    async fn live_expense_total<C: ConnectionTrait>(
        conn: &C,
        budget_uid: Uuid,
    ) -> Result<Decimal, DbErr> {
        let rows = Self::live_expenses(conn, budget_uid).await?;
        Ok(total_spent(&rows))
    }

    /// Writes `amount_remaining` from a fresh aggregate of live expenses.
    async fn store_remaining(
        txn: &sea_orm::DatabaseTransaction,
        budget: budgets::Model,
    ) -> Result<(), BudgetError> {
        let gross = budget.gross_amount;
        let total = Self::live_expense_total(txn, budget.uid).await?;

        let mut active: budgets::ActiveModel = budget.into();
        active.amount_remaining = Set(gross - total);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;

        Ok(())
    }
}

// ============================================================================
// Aggregation helpers
// ============================================================================

/// Sums `amount_spent` across expense rows.
#[must_use]
pub fn total_spent(expenses: &[expenses::Model]) -> Decimal {
    expenses.iter().map(|e| e.amount_spent).sum()
}

/// Remaining allocation for a gross amount after the given expenses.
#[must_use]
pub fn remaining_after(gross_amount: Decimal, expenses: &[expenses::Model]) -> Decimal {
    gross_amount - total_spent(expenses)
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
