// HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use validator::Validate;

use crate::auth::error::AuthError;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, UserResponse,
};

/// Handler for POST /api/auth/register
pub async fn register_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .register(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /api/auth/login
pub async fn login_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

/// Handler for POST /api/auth/refresh
/// Rotates the refresh token: the presented token is single-use
pub async fn refresh_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await?;

    Ok(Json(response))
}

/// Handler for POST /api/auth/logout
pub async fn logout_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    state.auth_service.logout(&request.refresh_token).await?;

    Ok(Json(json!({ "message": "Logged out" })))
}

/// Handler for GET /api/auth/me
pub async fn me_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth_service.get_current_user(user.user_id).await?;
    Ok(Json(profile))
}

/// Handler for POST /api/auth/forgot-password
/// Responds identically whether or not the email is registered
pub async fn forgot_password_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    state.auth_service.forgot_password(&request.email).await?;

    Ok(Json(
        json!({ "message": "If the email is registered, a reset code has been sent" }),
    ))
}

/// Handler for POST /api/auth/reset-password
pub async fn reset_password_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    state
        .auth_service
        .reset_password(&request.email, &request.otp, &request.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password has been reset" })))
}
