use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use platform_core::{AppError, ErrorResponse};
use platform_models::{
    CreateServiceDto, HeartbeatRequest, HubService, MarketingService, PublicService, Service,
    SuccessResponse, UpdateServiceDto, UseService,
};

use super::service::CatalogService;
use crate::middleware::auth::{AuthUser, RequireApiAdmin};
use crate::modules::usage_logs::service::UsageLogService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a service (admin only)
#[utoipa::path(
    post,
    path = "/private/services",
    request_body = CreateServiceDto,
    responses(
        (status = 201, description = "Service created", body = SuccessResponse<Service>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 409, description = "Service name already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state, dto))]
pub async fn create_service(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    ValidatedJson(dto): ValidatedJson<CreateServiceDto>,
) -> Result<(StatusCode, Json<SuccessResponse<Service>>), AppError> {
    let service = CatalogService::create_service(&state.stores, &state.config, dto).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(service))))
}

/// List all services
#[utoipa::path(
    get,
    path = "/private/services",
    responses(
        (status = 200, description = "List of services", body = SuccessResponse<Vec<PublicService>>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn get_services(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<SuccessResponse<Vec<PublicService>>>, AppError> {
    let services = CatalogService::get_services(&state.stores, &state.config).await?;
    Ok(Json(SuccessResponse::new(services)))
}

/// List services shown on the marketing site
#[utoipa::path(
    get,
    path = "/private/services/marketing",
    responses(
        (status = 200, description = "Marketing services", body = SuccessResponse<Vec<MarketingService>>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn get_marketing_services(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<SuccessResponse<Vec<MarketingService>>>, AppError> {
    let services = CatalogService::get_marketing_services(&state.stores, &state.config).await?;
    Ok(Json(SuccessResponse::new(services)))
}

/// Get a service by numeric id or name
#[utoipa::path(
    get,
    path = "/private/services/{identifier}",
    params(
        ("identifier" = String, Path, description = "Numeric service id or name")
    ),
    responses(
        (status = 200, description = "Service found", body = SuccessResponse<PublicService>),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(identifier): Path<String>,
) -> Result<Json<SuccessResponse<PublicService>>, AppError> {
    let service = CatalogService::get_service(&state.stores, &state.config, &identifier).await?;
    Ok(Json(SuccessResponse::new(service)))
}

/// Update a service (admin only)
#[utoipa::path(
    put,
    path = "/private/services/{id}",
    params(
        ("id" = i64, Path, description = "Service id")
    ),
    request_body = UpdateServiceDto,
    responses(
        (status = 200, description = "Service updated", body = SuccessResponse<Service>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 409, description = "Service name already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state, dto))]
pub async fn update_service(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateServiceDto>,
) -> Result<Json<SuccessResponse<Service>>, AppError> {
    let service = CatalogService::update_service(&state.stores, &state.config, id, dto).await?;
    Ok(Json(SuccessResponse::new(service)))
}

/// Delete a service (admin only)
#[utoipa::path(
    delete,
    path = "/private/services/{id}",
    params(
        ("id" = i64, Path, description = "Service id")
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    CatalogService::delete_service(&state.stores, &state.config, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the services available to an organization
#[utoipa::path(
    get,
    path = "/private/organizations/{id}/services",
    params(
        ("id" = i64, Path, description = "Organization id")
    ),
    responses(
        (status = 200, description = "Organization services", body = SuccessResponse<Vec<HubService>>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn get_organization_services(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(organization_id): Path<i64>,
) -> Result<Json<SuccessResponse<Vec<HubService>>>, AppError> {
    let services =
        CatalogService::get_organization_services(&state.stores, &state.config, organization_id)
            .await?;
    Ok(Json(SuccessResponse::new(services)))
}

/// Make a service available to an organization (admin only)
#[utoipa::path(
    post,
    path = "/private/services/{id}/organization/{org_id}",
    params(
        ("id" = i64, Path, description = "Service id"),
        ("org_id" = i64, Path, description = "Organization id")
    ),
    responses(
        (status = 204, description = "Service available to the organization"),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin privileges required", body = ErrorResponse),
        (status = 404, description = "Service or organization not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Services"
)]
#[instrument(skip(state))]
pub async fn set_availability_to_organization(
    State(state): State<AppState>,
    _admin: RequireApiAdmin,
    Path((service_id, organization_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    CatalogService::set_availability_to_organization(
        &state.stores,
        &state.config,
        service_id,
        organization_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start using a service as the authenticated user
#[utoipa::path(
    post,
    path = "/private/services/{id}/use",
    params(
        ("id" = i64, Path, description = "Service id")
    ),
    responses(
        (status = 201, description = "Usage started; log_id identifies the session", body = SuccessResponse<UseService>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Service or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Usage"
)]
#[instrument(skip(state))]
pub async fn use_service(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(service_id): Path<i64>,
) -> Result<(StatusCode, Json<SuccessResponse<UseService>>), AppError> {
    let user_id = auth_user.user_id()?;
    let usage =
        UsageLogService::start_usage(&state.stores, &state.config, user_id, service_id).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(usage))))
}

/// Add elapsed seconds to an open usage log
#[utoipa::path(
    patch,
    path = "/private/services/heartbeat",
    request_body = HeartbeatRequest,
    responses(
        (status = 204, description = "Heartbeat recorded"),
        (status = 400, description = "Negative duration", body = ErrorResponse),
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
pub async fn heartbeat(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<HeartbeatRequest>,
) -> Result<StatusCode, AppError> {
    UsageLogService::heartbeat(&state.stores, &state.config, dto.log_id, dto.duration).await?;
    Ok(StatusCode::NO_CONTENT)
}
