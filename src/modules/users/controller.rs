use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use platform_core::{AppError, ErrorResponse};
use platform_models::{CreateUserDto, PublicUser, SuccessResponse, UpdateUserDto};

use super::service::UserService;
use crate::middleware::auth::{AuthUser, RequireApiAdmin};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a new user (admin only)
#[utoipa::path(
    post,
    path = "/private/user/create",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created successfully", body = SuccessResponse<PublicUser>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<SuccessResponse<PublicUser>>), AppError> {
    let user = UserService::create_user(&state.stores, &state.config, dto).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(user))))
}

/// List active users
#[utoipa::path(
    get,
    path = "/private/users",
    responses(
        (status = 200, description = "List of users", body = SuccessResponse<Vec<PublicUser>>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<SuccessResponse<Vec<PublicUser>>>, AppError> {
    let users = UserService::get_users(&state.stores, &state.config).await?;
    Ok(Json(SuccessResponse::new(users)))
}

/// Get a user by numeric id or email
#[utoipa::path(
    get,
    path = "/private/user/{identifier}",
    params(
        ("identifier" = String, Path, description = "Numeric user id or email")
    ),
    responses(
        (status = 200, description = "User found", body = SuccessResponse<PublicUser>),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(identifier): Path<String>,
) -> Result<Json<SuccessResponse<PublicUser>>, AppError> {
    let user = UserService::get_user(&state.stores, &state.config, &identifier).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/private/user/{id}",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = SuccessResponse<PublicUser>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<SuccessResponse<PublicUser>>, AppError> {
    let user = UserService::update_user(&state.stores, &state.config, id, dto).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// Archive a user (admin only)
#[utoipa::path(
    delete,
    path = "/private/user/{id}",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User archived"),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    UserService::archive_user(&state.stores, &state.config, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
