//! Authentication routes for register, login, token refresh, and `/me`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use curafin_core::auth::{hash_password, verify_password};
use curafin_db::{
    DepartmentRepository, UserRepository,
    entities::{sea_orm_active_enums::UserRole, users},
};
use curafin_shared::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, ROLE_ADMIN, ROLE_STAFF,
    TokenPair, UserInfo,
};
use curafin_shared::AppError;

/// Minimum accepted password length for registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that require an authenticated caller.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Maps a role enum to its claims string.
fn role_str(role: &UserRole) -> &'static str {
    match role {
        UserRole::Admin => ROLE_ADMIN,
        UserRole::Staff => ROLE_STAFF,
    }
}

/// Builds the user payload returned by auth endpoints.
fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        uid: user.uid,
        email: user.email,
        full_name: user.full_name,
        role: role_str(&user.role).to_string(),
        department_uid: user.department_uid,
    }
}

/// POST /auth/register - Register a new staff user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return error_response(&AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let user_repo = UserRepository::new((*state.db).clone());

    // Check if email already exists
    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return error_response(&AppError::ResourceExists(
                "An account with this email already exists".to_string(),
            ));
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return error_response(&AppError::Database(
                "An unexpected database error occurred".to_string(),
            ));
        }
    }

    // The department is optional, but when given it must exist
    if let Some(department_uid) = payload.department_uid {
        let department_repo = DepartmentRepository::new((*state.db).clone());
        match department_repo.get(department_uid).await {
            Ok(_) => {}
            Err(curafin_db::repositories::DepartmentError::NotFound(_)) => {
                return error_response(&AppError::BadRequest(format!(
                    "Department not found: {department_uid}"
                )));
            }
            Err(e) => {
                error!(error = %e, "Database error checking department");
                return error_response(&AppError::Database(
                    "An unexpected database error occurred".to_string(),
                ));
            }
        }
    }

    // Hash password
    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return error_response(&AppError::Internal(
                "An error occurred during registration".to_string(),
            ));
        }
    };

    // Self-service registration always creates staff; administrators are
    // provisioned by the seeder or by an existing administrator.
    let user = match user_repo
        .create(
            &payload.email,
            &password_hash,
            &payload.full_name,
            UserRole::Staff,
            payload.department_uid,
        )
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return error_response(&AppError::Database(
                "An unexpected database error occurred".to_string(),
            ));
        }
    };

    info!(user_uid = %user.uid, email = %user.email, "New user registered");

    (
        StatusCode::CREATED,
        Json(json!({
            "user": user_info(user),
            "message": "Registration successful. You can now log in."
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return error_response(&AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return error_response(&AppError::Database(
                "An unexpected database error occurred".to_string(),
            ));
        }
    };

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_uid = %user.uid, "Failed login attempt - invalid password");
            return error_response(&AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return error_response(&AppError::Internal(
                "An error occurred during login".to_string(),
            ));
        }
    }

    // Generate tokens
    let role = role_str(&user.role);
    let access_token = match state.jwt_service.generate_access_token(user.uid, role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return error_response(&AppError::Internal(
                "An error occurred during login".to_string(),
            ));
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(user.uid, role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return error_response(&AppError::Internal(
                "An error occurred during login".to_string(),
            ));
        }
    };

    info!(user_uid = %user.uid, "User logged in successfully");

    let response = LoginResponse {
        user: user_info(user),
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Rotate tokens using a refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    // Validate refresh token
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let message = match e {
                curafin_shared::JwtError::Expired => "Refresh token has expired",
                _ => "Invalid refresh token",
            };
            return error_response(&AppError::Unauthorized(message.to_string()));
        }
    };

    // Issue a fresh pair; the old refresh token ages out on its own
    let access_token = match state
        .jwt_service
        .generate_access_token(claims.user_uid(), &claims.role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return error_response(&AppError::Internal(
                "An error occurred during token refresh".to_string(),
            ));
        }
    };
    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(claims.user_uid(), &claims.role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return error_response(&AppError::Internal(
                "An error occurred during token refresh".to_string(),
            ));
        }
    };

    (
        StatusCode::OK,
        Json(TokenPair {
            access_token,
            refresh_token,
            expires_in: state.jwt_service.access_token_expires_in(),
        }),
    )
        .into_response()
}

/// GET /auth/me - Return the authenticated user's profile.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_uid(auth.user_uid()).await {
        Ok(Some(user)) => {
            (StatusCode::OK, Json(json!({ "user": user_info(user) }))).into_response()
        }
        Ok(None) => {
            // Valid token for a user that has since been removed
            error_response(&AppError::Unauthorized(
                "User account no longer exists".to_string(),
            ))
        }
        Err(e) => {
            error!(error = %e, "Database error fetching user profile");
            error_response(&AppError::Database(
                "An unexpected database error occurred".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_str() {
        assert_eq!(role_str(&UserRole::Admin), "admin");
        assert_eq!(role_str(&UserRole::Staff), "staff");
    }
}
