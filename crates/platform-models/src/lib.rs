//! # Platform Models
//!
//! Domain models and DTOs for the platform API: stored entities, the
//! projections handed to clients, and request/response bodies.
//!
//! # Modules
//!
//! - [`auth`]: Login, refresh and password reset DTOs
//! - [`audit`]: Append-only user action log
//! - [`organizations`]: Tenant organizations
//! - [`response`]: Success envelope
//! - [`services`]: Service catalogue and its projections
//! - [`usage_logs`]: Service usage sessions
//! - [`users`]: Users and well-known role ids

pub mod audit;
pub mod auth;
pub mod organizations;
pub mod response;
pub mod services;
pub mod usage_logs;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use audit::{AuditAction, NewUserLog, UserLog};
pub use auth::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    RefreshTokenRequest, ResetPasswordRequest,
};
pub use organizations::{NewOrganization, Organization};
pub use response::SuccessResponse;
pub use services::{
    CreateServiceDto, HeartbeatRequest, HubService, MarketingService, PublicService, Service,
    UpdateServiceDto, UseService,
};
pub use usage_logs::{NewUsageLog, UsageLog, UsageLogView};
pub use users::{CreateUserDto, NewUser, PublicUser, UpdateUserDto, User, UserPatch, system_roles};
