use axum::Json;
use axum::extract::State;
use tracing::instrument;

use platform_core::{AppError, ErrorResponse};
use platform_models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest,
    ResetPasswordRequest,
};

use super::service::AuthService;
use crate::middleware::auth::ClientIp;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login with email and password
#[utoipa::path(
    post,
    path = "/public/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Password does not match", body = ErrorResponse),
        (status = 404, description = "User email not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome = AuthService::login_by_email(&state.stores, &state.config, dto, ip).await?;
    Ok(Json(outcome.tokens.into()))
}

/// Login as the shared guest account
#[utoipa::path(
    post,
    path = "/public/login-guest",
    responses(
        (status = 200, description = "Guest login successful", body = LoginResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn login_guest(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome = AuthService::login_guest(&state.stores, &state.config, ip).await?;
    Ok(Json(outcome.tokens.into()))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/public/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = LoginResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn refresh_token(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome =
        AuthService::refresh(&state.stores, &state.config, &dto.refresh_token, ip).await?;
    Ok(Json(outcome.tokens.into()))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/public/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Password reset email sent if account exists", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(dto))]
pub async fn forgot_password(
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(&dto.email).await?;
    Ok(Json(MessageResponse {
        message: "If an account exists with that email, a password reset link has been sent."
            .to_string(),
    }))
}

/// Set a new password for an account
#[utoipa::path(
    post,
    path = "/public/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successful", body = MessageResponse),
        (status = 404, description = "User email not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state.stores, &state.config, dto).await?;
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully. You can now log in with your new password."
            .to_string(),
    }))
}
