use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use platform_core::ErrorResponse;
use platform_models::{
    CreateServiceDto, CreateUserDto, ForgotPasswordRequest, HeartbeatRequest, HubService,
    LoginRequest, LoginResponse, MarketingService, MessageResponse, PublicService, PublicUser,
    RefreshTokenRequest, ResetPasswordRequest, Service, UpdateServiceDto, UpdateUserDto,
    UsageLog, UsageLogView, UseService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::login_guest,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::services::controller::create_service,
        crate::modules::services::controller::get_services,
        crate::modules::services::controller::get_marketing_services,
        crate::modules::services::controller::get_service,
        crate::modules::services::controller::update_service,
        crate::modules::services::controller::delete_service,
        crate::modules::services::controller::get_organization_services,
        crate::modules::services::controller::set_availability_to_organization,
        crate::modules::services::controller::use_service,
        crate::modules::services::controller::heartbeat,
        crate::modules::usage_logs::controller::get_usage_logs,
        crate::modules::usage_logs::controller::get_usage_log,
        crate::modules::usage_logs::controller::delete_usage_log,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            MessageResponse,
            PublicUser,
            CreateUserDto,
            UpdateUserDto,
            Service,
            PublicService,
            HubService,
            MarketingService,
            CreateServiceDto,
            UpdateServiceDto,
            UseService,
            HeartbeatRequest,
            UsageLog,
            UsageLogView,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, guest login, token refresh and password reset"),
        (name = "Users", description = "User management endpoints"),
        (name = "Services", description = "Service catalogue endpoints"),
        (name = "Usage", description = "Service usage metering")
    ),
    info(
        title = "Platform API",
        version = "0.1.0",
        description = "Multi-tenant platform backend built with Rust, Axum, and PostgreSQL featuring JWT-based authentication.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_and_private_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/public/login"));
        assert!(doc.paths.paths.contains_key("/private/services/heartbeat"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
