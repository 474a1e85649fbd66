//! Session issuance: credential and guest logins, refresh-token exchange and
//! password reset.
//!
//! Every entry point runs under the configured per-operation deadline. A
//! successful login always yields its tokens; the audit write that follows is
//! best effort and its outcome is reported in [`LoginOutcome::audit`].

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use platform_auth::{TokenPair, TokenSubject, issue_token_pair, verify_refresh_token};
use platform_config::{AppConfig, JwtConfig};
use platform_core::{AppError, hash_password_blocking, verify_credentials, with_deadline};
use platform_db::{StoreError, Stores, Visibility};
use platform_models::{
    AuditAction, LoginRequest, NewUserLog, ResetPasswordRequest, User, UserPatch, system_roles,
};

use crate::metrics::{
    track_audit_write_failure, track_login_failure, track_login_success, track_tokens_issued,
};

/// Whether the audit entry for a session was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    Recorded,
    Failed(String),
}

/// Result of a successful login, guest login or refresh.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub audit: AuditStatus,
}

/// Claims subject for `user`. Only admins get `api_admin`.
pub fn token_subject(user: &User) -> TokenSubject {
    TokenSubject {
        user_id: user.id,
        display_name: user.display_name.clone(),
        organization_id: user.organization_id,
        organization_role_id: user.organization_role_id,
        user_role_id: user.role_id,
        api_admin: system_roles::is_admin(user.role_id),
    }
}

/// Metric label for a failed email lookup. Store outages are not login
/// failures and get no label.
fn lookup_failure_reason(err: &StoreError) -> Option<&'static str> {
    err.is_not_found().then_some("unknown_email")
}

fn email_lookup_error(err: StoreError) -> AppError {
    if err.is_not_found() {
        AppError::not_found(anyhow!("User email not found"))
    } else {
        err.into_app_error()
    }
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(stores, config, dto), fields(email = %dto.email))]
    pub async fn login_by_email(
        stores: &Stores,
        config: &AppConfig,
        dto: LoginRequest,
        ip_address: Option<String>,
    ) -> Result<LoginOutcome, AppError> {
        with_deadline(config.context_timeout, async {
            let user = stores
                .users
                .find_by_email(&dto.email, Visibility::Active)
                .await
                .map_err(|e| {
                    if let Some(reason) = lookup_failure_reason(&e) {
                        track_login_failure(reason);
                    }
                    email_lookup_error(e)
                })?;

            verify_credentials(dto.password, user.password_hash.clone())
                .await
                .inspect_err(|_| track_login_failure("password_mismatch"))?;

            Self::open_session(stores, &config.jwt, &user, AuditAction::Login, ip_address).await
        })
        .await
    }

    /// Logs in as the pre-provisioned guest account.
    #[instrument(skip(stores, config))]
    pub async fn login_guest(
        stores: &Stores,
        config: &AppConfig,
        ip_address: Option<String>,
    ) -> Result<LoginOutcome, AppError> {
        with_deadline(config.context_timeout, async {
            let guest = stores
                .users
                .find_by_email(&config.guest_email, Visibility::Active)
                .await
                .map_err(|e| {
                    if e.is_not_found() {
                        AppError::internal(anyhow!(
                            "guest account {} is not provisioned",
                            config.guest_email
                        ))
                    } else {
                        e.into_app_error()
                    }
                })?;

            Self::open_session(
                stores,
                &config.jwt,
                &guest,
                AuditAction::LoginGuest,
                ip_address,
            )
            .await
        })
        .await
    }

    /// Exchanges a valid refresh token for a new pair. The identity is
    /// reloaded so archived users cannot keep refreshing.
    #[instrument(skip(stores, config, refresh_token))]
    pub async fn refresh(
        stores: &Stores,
        config: &AppConfig,
        refresh_token: &str,
        ip_address: Option<String>,
    ) -> Result<LoginOutcome, AppError> {
        let claims = verify_refresh_token(refresh_token, &config.jwt)?;
        let user_id = claims.user_id()?;

        with_deadline(config.context_timeout, async {
            let user = stores
                .users
                .find_by_id(user_id, Visibility::Active)
                .await
                .map_err(|e| {
                    if e.is_not_found() {
                        AppError::unauthorized("User is no longer active")
                    } else {
                        e.into_app_error()
                    }
                })?;

            Self::open_session(stores, &config.jwt, &user, AuditAction::Refresh, ip_address).await
        })
        .await
    }

    /// Sets a new password. Tokens issued before the reset stay valid until
    /// they expire.
    #[instrument(skip(stores, config, dto), fields(email = %dto.email))]
    pub async fn reset_password(
        stores: &Stores,
        config: &AppConfig,
        dto: ResetPasswordRequest,
    ) -> Result<(), AppError> {
        with_deadline(config.context_timeout, async {
            let user = stores
                .users
                .find_by_email(&dto.email, Visibility::Active)
                .await
                .map_err(email_lookup_error)?;

            let password_hash = hash_password_blocking(dto.new_password, config.bcrypt_cost).await?;
            let patch = UserPatch {
                password_hash: Some(password_hash),
                ..UserPatch::default()
            };
            stores
                .users
                .update(user.id, patch)
                .await
                .map_err(StoreError::into_app_error)?;

            Self::record_audit(stores, user.id, AuditAction::PasswordReset, None).await;
            info!(user_id = user.id, "Password reset");
            Ok(())
        })
        .await
    }

    /// Password reset emails are not sent; the request always succeeds so
    /// it reveals nothing about which accounts exist.
    #[instrument(skip(email))]
    pub async fn forgot_password(email: &str) -> Result<(), AppError> {
        info!("Forgot-password requested; email delivery is disabled");
        Ok(())
    }

    async fn open_session(
        stores: &Stores,
        jwt_config: &JwtConfig,
        user: &User,
        action: AuditAction,
        ip_address: Option<String>,
    ) -> Result<LoginOutcome, AppError> {
        let tokens = issue_token_pair(&token_subject(user), jwt_config)?;
        track_tokens_issued(2);
        track_login_success(action.as_str());

        let audit = Self::record_audit(stores, user.id, action, ip_address).await;

        Ok(LoginOutcome { tokens, audit })
    }

    async fn record_audit(
        stores: &Stores,
        user_id: i64,
        action: AuditAction,
        ip_address: Option<String>,
    ) -> AuditStatus {
        let entry = NewUserLog {
            user_id,
            action,
            ip_address,
        };

        match stores.audit.append(entry).await {
            Ok(_) => AuditStatus::Recorded,
            Err(e) => {
                warn!(user_id, action = %action, error = %e, "Failed to write audit log");
                track_audit_write_failure(action.as_str());
                AuditStatus::Failed(e.to_string())
            }
        }
    }
}
