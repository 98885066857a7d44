//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use curafin_shared::AppError;

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod departments;
pub mod health;
pub mod invoices;

/// Creates the API router: public routes plus protected routes behind the
/// auth middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(departments::routes())
        .merge(categories::routes())
        .merge(budgets::routes())
        .merge(invoices::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Renders an [`AppError`] as an HTTP response.
///
/// Every error leaving a route handler goes through here, so the whole API
/// speaks one error shape: `{ "error": CODE, "message": text }`.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Rejects callers without the administrator role.
pub(crate) fn require_admin(auth: &crate::middleware::AuthUser) -> Result<(), Response> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(error_response(&AppError::InsufficientPermissions(
            "Administrator role required".to_string(),
        )))
    }
}

/// Deserializes a patch field that distinguishes "absent" from "null".
///
/// Combined with `#[serde(default)]` on an `Option<Option<T>>` field:
/// an absent field stays `None`, an explicit `null` becomes `Some(None)`,
/// and a value becomes `Some(Some(value))`.
pub(crate) fn deserialize_patch<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
    };
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use curafin_shared::auth::ROLE_STAFF;
    use curafin_shared::{JwtConfig, JwtService};

    /// Builds an `AppState` around a disconnected database handle.
    ///
    /// Requests that reach a repository fail with a connection error, so
    /// these tests cover the routing, middleware, and error-mapping layers
    /// without needing a live database.
    fn test_state(jwt_config: JwtConfig) -> AppState {
        AppState {
            db: Arc::new(DatabaseConnection::default()),
            jwt_service: Arc::new(JwtService::new(jwt_config)),
        }
    }

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            ..JwtConfig::default()
        }
    }

    #[tokio::test]
    async fn test_health_no_auth_returns_200() {
        let app = crate::create_router(test_state(test_config()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "curafin");
    }

    #[tokio::test]
    async fn test_list_budgets_no_auth_returns_401() {
        let app = crate::create_router(test_state(test_config()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/budgets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "UNAUTHORIZED");
        assert_eq!(
            json["message"],
            "Authorization header with Bearer token is required"
        );
    }

    #[tokio::test]
    async fn test_malformed_token_returns_401() {
        let app = crate::create_router(test_state(test_config()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/budgets")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Invalid or malformed token");
    }

    #[tokio::test]
    async fn test_expired_token_returns_401() {
        // A negative expiry mints tokens that are already past their exp.
        let state = test_state(JwtConfig {
            access_token_expires_minutes: -120,
            ..test_config()
        });
        let token = state
            .jwt_service
            .generate_access_token(Uuid::new_v4(), ROLE_STAFF)
            .unwrap();
        let app = crate::create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/budgets")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Token has expired");
    }

    #[tokio::test]
    async fn test_create_department_as_staff_returns_403() {
        let state = test_state(test_config());
        let token = state
            .jwt_service
            .generate_access_token(Uuid::new_v4(), ROLE_STAFF)
            .unwrap();
        let app = crate::create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/departments")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"name":"Radiology"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INSUFFICIENT_PERMISSIONS");
    }

    #[tokio::test]
    async fn test_register_short_password_returns_400() {
        let app = crate::create_router(test_state(test_config()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/register")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"email":"new.user@example.com","password":"short","full_name":"New User"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_database_unavailable_returns_500() {
        let state = test_state(test_config());
        let token = state
            .jwt_service
            .generate_access_token(Uuid::new_v4(), ROLE_STAFF)
            .unwrap();
        let app = crate::create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/departments")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert_eq!(json["message"], "An unexpected database error occurred");
    }
}
