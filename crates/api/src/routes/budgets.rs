//! Budget ledger routes: budgets and their nested expenses.
//!
//! Listing is owner-scoped for staff and unrestricted for administrators;
//! `assigned_to_me` flips the listing to budgets assigned to the caller.
//! Ownership and admin rules on mutations are enforced by the repository.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use curafin_db::{
    BudgetRepository,
    entities::{
        budgets, expenses,
        sea_orm_active_enums::{BudgetAvailability, BudgetStatus},
    },
    repositories::{
        BudgetError, BudgetListFilter, BudgetOverview, CreateBudgetInput, CreateExpenseInput,
        UpdateBudgetInput, UpdateExpenseInput,
    },
};
use curafin_shared::types::{PageRequest, PageResponse};
use curafin_shared::AppError;

/// Creates the budget and expense routes (requires auth middleware to be
/// applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route("/budgets", post(create_budget))
        .route("/budgets/{budget_uid}", get(get_budget))
        .route("/budgets/{budget_uid}", patch(update_budget))
        .route("/budgets/{budget_uid}", delete(delete_budget))
        .route("/budgets/{budget_uid}/status", patch(set_budget_status))
        .route("/budgets/{budget_uid}/assignee", patch(assign_budget))
        .route("/budgets/{budget_uid}/expenses", get(list_expenses))
        .route("/budgets/{budget_uid}/expenses", post(add_expense))
        .route("/expenses/{expense_uid}", get(get_expense))
        .route("/expenses/{expense_uid}", patch(update_expense))
        .route("/expenses/{expense_uid}", delete(delete_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a budget.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBudgetRequest {
    /// Budget title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Short description.
    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: String,
    /// Gross amount allocated, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_amount: Decimal,
    /// Department receiving the allocation.
    pub department_uid: Uuid,
    /// Optional initial assignee.
    pub assignee_uid: Option<Uuid>,
    /// When the allocation was received; defaults to now.
    pub received_at: Option<DateTime<FixedOffset>>,
}

/// Request body for updating a budget.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBudgetRequest {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// New gross amount, as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub gross_amount: Option<Decimal>,
    /// New availability.
    pub availability: Option<BudgetAvailability>,
    /// New received-at timestamp.
    pub received_at: Option<DateTime<FixedOffset>>,
}

/// Request body for setting the approval status.
#[derive(Debug, Deserialize)]
pub struct SetBudgetStatusRequest {
    /// Target status.
    pub status: BudgetStatus,
}

/// Request body for assigning a budget. A `null` or omitted assignee
/// clears the assignment.
#[derive(Debug, Deserialize)]
pub struct AssignBudgetRequest {
    /// User the budget is assigned to.
    pub assignee_uid: Option<Uuid>,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    /// Expense title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Short description.
    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: String,
    /// Optional free-form note.
    pub note: Option<String>,
    /// Amount spent, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_spent: Decimal,
    /// Category the spend belongs to.
    pub category_uid: Uuid,
}

/// Request body for updating an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpenseRequest {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// New note; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub note: Option<Option<String>>,
    /// New amount, as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount_spent: Option<Decimal>,
    /// New category.
    pub category_uid: Option<Uuid>,
}

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct BudgetListQuery {
    /// Filter by approval status.
    pub status: Option<BudgetStatus>,
    /// Filter by availability.
    pub availability: Option<BudgetAvailability>,
    /// Search over title, description, and serial number.
    pub q: Option<String>,
    /// List budgets assigned to the caller instead of owned ones.
    #[serde(default)]
    pub assigned_to_me: bool,
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    /// Search over title, description, and serial number.
    pub q: Option<String>,
}

/// Renders a budget overview: the row plus its live-derived figures.
fn budget_json(overview: &BudgetOverview) -> serde_json::Value {
    let budget = &overview.budget;
    json!({
        "uid": budget.uid,
        "serial_no": budget.serial_no,
        "title": budget.title,
        "description": budget.description,
        "status": budget.status,
        "availability": budget.availability,
        "department_uid": budget.department_uid,
        "owner_uid": budget.user_uid,
        "approver_uid": budget.approver_uid,
        "assignee_uid": budget.assignee_uid,
        "received_at": budget.received_at,
        "approved_at": budget.approved_at,
        "created_at": budget.created_at,
        "updated_at": budget.updated_at,
        "figures": overview.figures
    })
}

/// Renders an expense row.
fn expense_json(expense: &expenses::Model) -> serde_json::Value {
    json!({
        "uid": expense.uid,
        "serial_no": expense.serial_no,
        "title": expense.title,
        "description": expense.description,
        "note": expense.note,
        "amount_spent": expense.amount_spent,
        "budget_uid": expense.budget_uid,
        "category_uid": expense.category_uid,
        "recorded_by": expense.user_uid,
        "created_at": expense.created_at,
        "updated_at": expense.updated_at
    })
}

/// Rebuilds an overview from a freshly mutated budget row. Every mutation
/// path recomputes `amount_remaining` in-transaction, so the stored value
/// is current.
fn overview_from_row(budget: budgets::Model) -> BudgetOverview {
    let total = budget.gross_amount - budget.amount_remaining;
    BudgetOverview::from_live_total(budget, total)
}

/// Whether the caller may read this budget and its expenses.
fn can_view_budget(auth: &AuthUser, budget: &budgets::Model) -> bool {
    auth.is_admin()
        || budget.user_uid == auth.user_uid()
        || budget.assignee_uid == Some(auth.user_uid())
}

// ============================================================================
// Budget Handlers
// ============================================================================

/// GET /budgets - List budgets. Staff see budgets they own (or, with
/// `assigned_to_me`, budgets assigned to them); administrators see all.
async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<BudgetListQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    let mut filter = BudgetListFilter {
        status: query.status,
        availability: query.availability,
        q: query.q,
        ..BudgetListFilter::default()
    };
    if query.assigned_to_me {
        filter.assignee_uid = Some(auth.user_uid());
    } else if !auth.is_admin() {
        filter.owner_uid = Some(auth.user_uid());
    }

    match repo.list_budgets(&filter, &page).await {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(budget_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list budgets");
            map_budget_error(&e)
        }
    }
}

/// POST /budgets - Create a budget. Admin callers get immediate approval;
/// staff budgets start pending.
async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBudgetRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = BudgetRepository::new((*state.db).clone());
    let input = CreateBudgetInput {
        department_uid: payload.department_uid,
        gross_amount: payload.gross_amount,
        title: payload.title,
        description: payload.description,
        received_at: payload.received_at,
        assignee_uid: payload.assignee_uid,
    };

    match repo.create_budget(&auth.caller(), input).await {
        Ok(budget) => {
            info!(
                budget_uid = %budget.uid,
                serial_no = budget.serial_no.as_deref().unwrap_or_default(),
                owner_uid = %auth.user_uid(),
                "Budget created"
            );
            (
                StatusCode::CREATED,
                Json(budget_json(&overview_from_row(budget))),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create budget");
            map_budget_error(&e)
        }
    }
}

/// GET `/budgets/{budget_uid}` - Get a budget with live-derived figures.
async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.get_budget(budget_uid).await {
        Ok(overview) => {
            if !can_view_budget(&auth, &overview.budget) {
                return error_response(&AppError::InsufficientPermissions(
                    "You do not have access to this budget".to_string(),
                ));
            }
            (StatusCode::OK, Json(budget_json(&overview))).into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// PATCH `/budgets/{budget_uid}` - Update a budget. Owner only; shrinking
/// the gross amount below the live spend is refused.
async fn update_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
    Json(payload): Json<UpdateBudgetRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = BudgetRepository::new((*state.db).clone());
    let input = UpdateBudgetInput {
        title: payload.title,
        description: payload.description,
        gross_amount: payload.gross_amount,
        availability: payload.availability,
        received_at: payload.received_at,
    };

    match repo.update_budget(&auth.caller(), budget_uid, input).await {
        Ok(budget) => {
            info!(budget_uid = %budget.uid, "Budget updated");
            (StatusCode::OK, Json(budget_json(&overview_from_row(budget)))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update budget");
            map_budget_error(&e)
        }
    }
}

/// DELETE `/budgets/{budget_uid}` - Delete a budget and all its expenses.
/// Owner only.
async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.delete_budget(&auth.caller(), budget_uid).await {
        Ok(()) => {
            info!(budget_uid = %budget_uid, "Budget deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete budget");
            map_budget_error(&e)
        }
    }
}

/// PATCH `/budgets/{budget_uid}/status` - Approve, reject, or reset a
/// budget. Administrators only.
async fn set_budget_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
    Json(payload): Json<SetBudgetStatusRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo
        .set_status(&auth.caller(), budget_uid, payload.status)
        .await
    {
        Ok(budget) => {
            info!(budget_uid = %budget.uid, status = ?budget.status, "Budget status changed");
            (StatusCode::OK, Json(budget_json(&overview_from_row(budget)))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to change budget status");
            map_budget_error(&e)
        }
    }
}

/// PATCH `/budgets/{budget_uid}/assignee` - Assign the budget to a user or
/// clear the assignment. Administrators only.
async fn assign_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
    Json(payload): Json<AssignBudgetRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo
        .assign(&auth.caller(), budget_uid, payload.assignee_uid)
        .await
    {
        Ok(budget) => {
            info!(budget_uid = %budget.uid, assignee_uid = ?budget.assignee_uid, "Budget assignment changed");
            (StatusCode::OK, Json(budget_json(&overview_from_row(budget)))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to assign budget");
            map_budget_error(&e)
        }
    }
}

// ============================================================================
// Expense Handlers
// ============================================================================

/// GET `/budgets/{budget_uid}/expenses` - List a budget's expenses.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
    Query(page): Query<PageRequest>,
    Query(query): Query<ExpenseListQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    // Visibility follows the parent budget
    match repo.get_budget(budget_uid).await {
        Ok(overview) => {
            if !can_view_budget(&auth, &overview.budget) {
                return error_response(&AppError::InsufficientPermissions(
                    "You do not have access to this budget".to_string(),
                ));
            }
        }
        Err(e) => return map_budget_error(&e),
    }

    match repo
        .list_expenses(budget_uid, query.q.as_deref(), &page)
        .await
    {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(expense_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            map_budget_error(&e)
        }
    }
}

/// POST `/budgets/{budget_uid}/expenses` - Record an expense against a
/// budget. Refused when the amount exceeds the remaining allocation.
async fn add_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_uid): Path<Uuid>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = BudgetRepository::new((*state.db).clone());
    let input = CreateExpenseInput {
        category_uid: payload.category_uid,
        amount_spent: payload.amount_spent,
        title: payload.title,
        description: payload.description,
        note: payload.note,
    };

    match repo.add_expense(&auth.caller(), budget_uid, input).await {
        Ok(expense) => {
            info!(
                expense_uid = %expense.uid,
                serial_no = expense.serial_no.as_deref().unwrap_or_default(),
                budget_uid = %budget_uid,
                "Expense recorded"
            );
            (StatusCode::CREATED, Json(expense_json(&expense))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record expense");
            map_budget_error(&e)
        }
    }
}

/// GET `/expenses/{expense_uid}` - Get a single expense.
async fn get_expense(
    State(state): State<AppState>,
    Path(expense_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.get_expense(expense_uid).await {
        Ok(expense) => (StatusCode::OK, Json(expense_json(&expense))).into_response(),
        Err(e) => map_budget_error(&e),
    }
}

/// PATCH `/expenses/{expense_uid}` - Update an expense. Only the recorder
/// may change it; the parent budget is recomputed in the same transaction.
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_uid): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = BudgetRepository::new((*state.db).clone());
    let input = UpdateExpenseInput {
        title: payload.title,
        description: payload.description,
        note: payload.note,
        amount_spent: payload.amount_spent,
        category_uid: payload.category_uid,
    };

    match repo.update_expense(&auth.caller(), expense_uid, input).await {
        Ok(expense) => {
            info!(expense_uid = %expense.uid, "Expense updated");
            (StatusCode::OK, Json(expense_json(&expense))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update expense");
            map_budget_error(&e)
        }
    }
}

/// DELETE `/expenses/{expense_uid}` - Delete an expense and return the
/// amount to the budget's remaining allocation.
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.delete_expense(&auth.caller(), expense_uid).await {
        Ok(()) => {
            info!(expense_uid = %expense_uid, "Expense deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete expense");
            map_budget_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps budget ledger errors to HTTP responses.
fn map_budget_error(e: &BudgetError) -> Response {
    let app = match e {
        BudgetError::NotFound(uid) => AppError::NotFound(format!("Budget not found: {uid}")),
        BudgetError::ExpenseNotFound(uid) => {
            AppError::NotFound(format!("Expense not found: {uid}"))
        }
        BudgetError::DepartmentNotFound(uid) => {
            AppError::BadRequest(format!("Department not found or inactive: {uid}"))
        }
        BudgetError::CategoryNotFound(uid) => {
            AppError::BadRequest(format!("Expense category not found or inactive: {uid}"))
        }
        BudgetError::AssigneeNotFound(uid) => {
            AppError::BadRequest(format!("Assignee not found: {uid}"))
        }
        BudgetError::NotOwner => {
            AppError::InsufficientPermissions("You do not own this record".to_string())
        }
        BudgetError::AdminOnly => {
            AppError::InsufficientPermissions("Administrator role required".to_string())
        }
        BudgetError::GrossBelowSpend { gross, spent } => AppError::BadRequest(format!(
            "Gross amount {gross} is below the outstanding spend {spent}"
        )),
        BudgetError::InsufficientRemaining {
            requested,
            remaining,
        } => AppError::BadRequest(format!(
            "Amount {requested} exceeds remaining budget {remaining}"
        )),
        BudgetError::Validation(err) => AppError::BadRequest(err.to_string()),
        BudgetError::Database(_) => {
            AppError::Database("An unexpected database error occurred".to_string())
        }
    };
    error_response(&app)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_create_budget_payload_parses_decimal_string() {
        let payload: CreateBudgetRequest = serde_json::from_str(
            r#"{
                "title": "Q3 equipment",
                "gross_amount": "2500.00",
                "department_uid": "b5e7a1c2-9e1f-4a7b-8d3c-2f6a0e9b4d11"
            }"#,
        )
        .expect("payload should deserialize");

        assert_eq!(payload.gross_amount, dec!(2500.00));
        assert!(payload.description.is_empty());
        assert!(payload.assignee_uid.is_none());
    }

    #[test]
    fn test_update_expense_note_patch_states() {
        // Absent: leave the note untouched
        let payload: UpdateExpenseRequest = serde_json::from_str(r#"{"title": "Taxi"}"#)
            .expect("payload should deserialize");
        assert_eq!(payload.note, None);

        // Explicit null: clear the note
        let payload: UpdateExpenseRequest =
            serde_json::from_str(r#"{"note": null}"#).expect("payload should deserialize");
        assert_eq!(payload.note, Some(None));

        // Value: replace the note
        let payload: UpdateExpenseRequest =
            serde_json::from_str(r#"{"note": "receipt attached"}"#)
                .expect("payload should deserialize");
        assert_eq!(payload.note, Some(Some("receipt attached".to_string())));
    }

    #[test]
    fn test_payload_validation_bounds() {
        let payload = CreateExpenseRequest {
            title: String::new(),
            description: String::new(),
            note: None,
            amount_spent: dec!(10),
            category_uid: Uuid::new_v4(),
        };
        assert!(payload.validate().is_err());

        let payload = CreateExpenseRequest {
            title: "Catering".to_string(),
            description: String::new(),
            note: None,
            amount_spent: dec!(10),
            category_uid: Uuid::new_v4(),
        };
        assert!(payload.validate().is_ok());
    }

    #[rstest]
    #[case(BudgetError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(BudgetError::ExpenseNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(BudgetError::NotOwner, StatusCode::FORBIDDEN)]
    #[case(BudgetError::AdminOnly, StatusCode::FORBIDDEN)]
    #[case(BudgetError::CategoryNotFound(Uuid::nil()), StatusCode::BAD_REQUEST)]
    #[case(
        BudgetError::GrossBelowSpend { gross: dec!(100), spent: dec!(250) },
        StatusCode::BAD_REQUEST
    )]
    #[case(
        BudgetError::InsufficientRemaining { requested: dec!(2000), remaining: dec!(1500) },
        StatusCode::BAD_REQUEST
    )]
    fn test_error_mapping_statuses(#[case] error: BudgetError, #[case] expected: StatusCode) {
        assert_eq!(map_budget_error(&error).status(), expected);
    }
}
