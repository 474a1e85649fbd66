use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use platform_core::{AppError, ErrorResponse};
use platform_models::{SuccessResponse, UsageLog, UsageLogView};

use super::service::UsageLogService;
use crate::middleware::auth::{AuthUser, RequireApiAdmin};
use crate::state::AppState;

/// List all usage logs
#[utoipa::path(
    get,
    path = "/private/user-service-logs",
    responses(
        (status = 200, description = "List of usage logs", body = SuccessResponse<Vec<UsageLog>>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Usage"
)]
#[instrument(skip(state))]
pub async fn get_usage_logs(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<SuccessResponse<Vec<UsageLog>>>, AppError> {
    let logs = UsageLogService::get_logs(&state.stores, &state.config).await?;
    Ok(Json(SuccessResponse::new(logs)))
}

/// Get usage logs by log id, `user:<id>` or `service:<id>`
#[utoipa::path(
    get,
    path = "/private/user-service-logs/{identifier}",
    params(
        ("identifier" = String, Path, description = "Log id, `user:<user_id>` or `service:<service_id>`")
    ),
    responses(
        (status = 200, description = "A single log for an id, a list for user/service keys", body = SuccessResponse<UsageLogView>),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Usage log not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Usage"
)]
#[instrument(skip(state))]
pub async fn get_usage_log(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(identifier): Path<String>,
) -> Result<Json<SuccessResponse<UsageLogView>>, AppError> {
    let view = UsageLogService::get_log(&state.stores, &state.config, &identifier).await?;
    Ok(Json(SuccessResponse::new(view)))
}

/// Delete a usage log (admin only)
#[utoipa::path(
    delete,
    path = "/private/user-service-logs/{id}",
    params(
        ("id" = i64, Path, description = "Usage log id")
    ),
    responses(
        (status = 204, description = "Usage log deleted"),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "Usage log not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Usage"
)]
#[instrument(skip(state))]
pub async fn delete_usage_log(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    UsageLogService::delete_log(&state.stores, &state.config, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
