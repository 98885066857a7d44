//! Administrative dashboard routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::middleware::AuthUser;
use crate::routes::{error_response, require_admin};
use crate::AppState;
use curafin_db::{
    DashboardRepository,
    repositories::{DashboardError, DepartmentUtilization, UtilizationRange},
};
use curafin_shared::AppError;

/// Creates the dashboard routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/dashboard/budget-utilization",
        get(get_budget_utilization),
    )
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for the budget utilization report.
#[derive(Debug, Deserialize)]
pub struct UtilizationQuery {
    /// Number of calendar months covered, ending with the end month.
    #[serde(default = "default_months")]
    pub months: u32,
    /// Last month of the window (1-12); defaults to the current month.
    pub end_month: Option<u32>,
    /// Year of the last month; defaults to the current year.
    pub end_year: Option<i32>,
}

const fn default_months() -> u32 {
    1
}

/// Renders one department's utilization row.
fn utilization_json(row: &DepartmentUtilization) -> serde_json::Value {
    json!({
        "department_uid": row.department_uid,
        "department_name": row.department_name,
        "total_budget": row.total_budget,
        "total_expenses": row.total_expenses,
        "utilization_percentage": row.utilization_percentage,
        "remaining_budget": row.remaining_budget
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /dashboard/budget-utilization - Per-department budget consumption
/// over a window of whole calendar months. Administrators only.
async fn get_budget_utilization(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UtilizationQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let repo = DashboardRepository::new((*state.db).clone());
    let range = UtilizationRange {
        months: query.months,
        end_month: query.end_month,
        end_year: query.end_year,
    };

    match repo.budget_utilization_by_department(&range).await {
        Ok(rows) => {
            let departments: Vec<serde_json::Value> =
                rows.iter().map(utilization_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "months": query.months,
                    "departments": departments
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to compute budget utilization");
            map_dashboard_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps dashboard errors to HTTP responses.
fn map_dashboard_error(e: &DashboardError) -> Response {
    let app = match e {
        DashboardError::InvalidRange => AppError::BadRequest(
            "Reporting range must cover at least one month and end in a valid month".to_string(),
        ),
        DashboardError::Database(_) => {
            AppError::Database("An unexpected database error occurred".to_string())
        }
    };
    error_response(&app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_one_month() {
        let query: UtilizationQuery =
            serde_json::from_str("{}").expect("query should deserialize");
        assert_eq!(query.months, 1);
        assert!(query.end_month.is_none());

        let query: UtilizationQuery =
            serde_json::from_value(json!({ "months": 6, "end_month": 3 }))
                .expect("query should deserialize");
        assert_eq!(query.months, 6);
        assert_eq!(query.end_month, Some(3));
    }

    #[test]
    fn test_error_mapping_statuses() {
        assert_eq!(
            map_dashboard_error(&DashboardError::InvalidRange).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
