//! Department reference-data routes.
//!
//! Departments are the allocation targets of the budget ledger. Reads are
//! open to any authenticated user; writes are restricted to administrators.

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
    DepartmentRepository,
    entities::{departments, sea_orm_active_enums::RecordStatus},
    repositories::{DepartmentError, UpdateDepartmentInput},
};
use curafin_shared::types::{PageRequest, PageResponse};
use curafin_shared::AppError;

/// Creates the department routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments))
        .route("/departments", post(create_department))
        .route("/departments/{department_uid}", get(get_department))
        .route("/departments/{department_uid}", patch(update_department))
        .route("/departments/{department_uid}", delete(delete_department))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a department.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    /// Department name (unique).
    #[validate(length(min = 1, max = 150))]
    pub name: String,
}

/// Request body for updating a department.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    /// New department name.
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    /// New activation status.
    pub status: Option<RecordStatus>,
}

/// Query parameters for listing departments.
#[derive(Debug, Deserialize)]
pub struct DepartmentListQuery {
    /// Name search.
    pub q: Option<String>,
    /// Filter by activation status.
    pub status: Option<RecordStatus>,
}

/// Renders a department row.
fn department_json(department: &departments::Model) -> serde_json::Value {
    json!({
        "uid": department.uid,
        "name": department.name,
        "status": department.status,
        "created_at": department.created_at,
        "updated_at": department.updated_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /departments - List departments with search and status filter.
async fn list_departments(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<DepartmentListQuery>,
) -> impl IntoResponse {
    let repo = DepartmentRepository::new((*state.db).clone());

    match repo.list(query.q.as_deref(), query.status, &page).await {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(department_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list departments");
            map_department_error(&e)
        }
    }
}

/// POST /departments - Create a department. Administrators only.
async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateDepartmentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = DepartmentRepository::new((*state.db).clone());

    match repo.create(&payload.name).await {
        Ok(department) => {
            info!(department_uid = %department.uid, name = %department.name, "Department created");
            (StatusCode::CREATED, Json(department_json(&department))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create department");
            map_department_error(&e)
        }
    }
}

/// GET `/departments/{department_uid}` - Get a department.
async fn get_department(
    State(state): State<AppState>,
    Path(department_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = DepartmentRepository::new((*state.db).clone());

    match repo.get(department_uid).await {
        Ok(department) => (StatusCode::OK, Json(department_json(&department))).into_response(),
        Err(e) => map_department_error(&e),
    }
}

/// PATCH `/departments/{department_uid}` - Update a department.
/// Administrators only.
async fn update_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_uid): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = DepartmentRepository::new((*state.db).clone());
    let input = UpdateDepartmentInput {
        name: payload.name,
        status: payload.status,
    };

    match repo.update(department_uid, input).await {
        Ok(department) => {
            info!(department_uid = %department.uid, "Department updated");
            (StatusCode::OK, Json(department_json(&department))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update department");
            map_department_error(&e)
        }
    }
}

/// DELETE `/departments/{department_uid}` - Delete a department.
/// Administrators only; refused while budgets, invoices, or users still
/// reference it.
async fn delete_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_uid): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let repo = DepartmentRepository::new((*state.db).clone());

    match repo.delete(department_uid).await {
        Ok(()) => {
            info!(department_uid = %department_uid, "Department deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete department");
            map_department_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps department errors to HTTP responses.
fn map_department_error(e: &DepartmentError) -> Response {
    let app = match e {
        DepartmentError::NotFound(uid) => AppError::NotFound(format!("Department not found: {uid}")),
        DepartmentError::DuplicateName(name) => {
            AppError::ResourceExists(format!("Department name already exists: {name}"))
        }
        DepartmentError::InUse => AppError::BadRequest(
            "Department is referenced by existing budgets, invoices, or users".to_string(),
        ),
        DepartmentError::Database(_) => {
            AppError::Database("An unexpected database error occurred".to_string())
        }
    };
    error_response(&app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_rejects_empty_name() {
        let payload = CreateDepartmentRequest {
            name: String::new(),
        };
        assert!(payload.validate().is_err());

        let payload = CreateDepartmentRequest {
            name: "Radiology".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_update_payload_allows_omitted_name() {
        let payload = UpdateDepartmentRequest {
            name: None,
            status: Some(RecordStatus::InActive),
        };
        assert!(payload.validate().is_ok());

        let payload = UpdateDepartmentRequest {
            name: Some(String::new()),
            status: None,
        };
        assert!(payload.validate().is_err());
    }
}
