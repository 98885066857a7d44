//! Expense category reference-data routes.
//!
//! Every expense is filed under a category; only active categories accept
//! new spend. Reads are open to any authenticated user; writes are
//! restricted to administrators.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::routes::{error_response, require_admin};
use crate::AppState;
use curafin_db::{
    CategoryRepository,
    entities::{expense_categories, sea_orm_active_enums::RecordStatus},
    repositories::{CategoryError, UpdateCategoryInput},
};
use curafin_shared::types::{PageRequest, PageResponse};
use curafin_shared::AppError;

/// Creates the expense category routes (requires auth middleware to be
/// applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expense-categories", get(list_categories))
        .route("/expense-categories", post(create_category))
        .route("/expense-categories/{category_uid}", get(get_category))
        .route("/expense-categories/{category_uid}", patch(update_category))
        .route("/expense-categories/{category_uid}", delete(delete_category))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an expense category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name (unique).
    #[validate(length(min = 1, max = 150))]
    pub name: String,
}

/// Request body for updating an expense category.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    /// New category name.
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    /// New activation status.
    pub status: Option<RecordStatus>,
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    /// Name search.
    pub q: Option<String>,
    /// Filter by activation status.
    pub status: Option<RecordStatus>,
}

/// Renders a category row.
fn category_json(category: &expense_categories::Model) -> serde_json::Value {
    json!({
        "uid": category.uid,
        "name": category.name,
        "status": category.status,
        "created_at": category.created_at,
        "updated_at": category.updated_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /expense-categories - List categories with search and status filter.
async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<CategoryListQuery>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.list(query.q.as_deref(), query.status, &page).await {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(category_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expense categories");
            map_category_error(&e)
        }
    }
}

/// POST /expense-categories - Create a category. Administrators only.
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = CategoryRepository::new((*state.db).clone());

    match repo.create(&payload.name).await {
        Ok(category) => {
            info!(category_uid = %category.uid, name = %category.name, "Expense category created");
            (StatusCode::CREATED, Json(category_json(&category))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create expense category");
            map_category_error(&e)
        }
    }
}

/// GET `/expense-categories/{category_uid}` - Get a category.
async fn get_category(
    State(state): State<AppState>,
    Path(category_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CategoryRepository::new((*state.db).clone());

    match repo.get(category_uid).await {
        Ok(category) => (StatusCode::OK, Json(category_json(&category))).into_response(),
        Err(e) => map_category_error(&e),
    }
}

/// PATCH `/expense-categories/{category_uid}` - Update a category.
/// Administrators only.
async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_uid): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = CategoryRepository::new((*state.db).clone());
    let input = UpdateCategoryInput {
        name: payload.name,
        status: payload.status,
    };

    match repo.update(category_uid, input).await {
        Ok(category) => {
            info!(category_uid = %category.uid, "Expense category updated");
            (StatusCode::OK, Json(category_json(&category))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update expense category");
            map_category_error(&e)
        }
    }
}

/// DELETE `/expense-categories/{category_uid}` - Delete a category.
/// Administrators only; refused while expenses still reference it.
async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_uid): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let repo = CategoryRepository::new((*state.db).clone());

    match repo.delete(category_uid).await {
        Ok(()) => {
            info!(category_uid = %category_uid, "Expense category deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete expense category");
            map_category_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps category errors to HTTP responses.
fn map_category_error(e: &CategoryError) -> Response {
    let app = match e {
        CategoryError::NotFound(uid) => {
            AppError::NotFound(format!("Expense category not found: {uid}"))
        }
        CategoryError::DuplicateName(name) => {
            AppError::ResourceExists(format!("Expense category name already exists: {name}"))
        }
        CategoryError::InUse => AppError::BadRequest(
            "Expense category is referenced by existing expenses".to_string(),
        ),
        CategoryError::Database(_) => {
            AppError::Database("An unexpected database error occurred".to_string())
        }
    };
    error_response(&app)
}
