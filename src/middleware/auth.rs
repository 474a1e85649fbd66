use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};

use platform_auth::{Claims, verify_access_token};
use platform_core::AppError;

use crate::state::AppState;

/// Extractor that verifies the bearer access token and provides its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Numeric user id decoded from the hex subject.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.0.user_id()
    }

    pub fn organization_id(&self) -> Option<i64> {
        self.0.organization_id
    }

    pub fn is_api_admin(&self) -> bool {
        self.0.api_admin
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_access_token(token, &state.config.jwt)?;

        Ok(AuthUser(claims))
    }
}

/// Like [`AuthUser`], but rejects tokens without the `api_admin` claim with
/// `403 Forbidden`.
#[derive(Debug, Clone)]
pub struct RequireApiAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireApiAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_api_admin() {
            return Err(AppError::forbidden("Access denied. Admin privileges required"));
        }

        Ok(RequireApiAdmin(auth_user))
    }
}

/// Caller address: the first `X-Forwarded-For` entry, else the peer address
/// when the server runs with connect info. `None` if neither is available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let ip = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        Ok(ClientIp(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use platform_auth::TokenUse;

    fn claims(api_admin: bool) -> Claims {
        Claims {
            sub: format!("{:x}", 255),
            name: "Test".to_string(),
            organization_id: Some(3),
            organization_role_id: None,
            user_role_id: 3,
            api_admin,
            token_use: TokenUse::Access,
            jti: "jti".to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id_decodes_hex_subject() {
        let auth_user = AuthUser(claims(false));
        assert_eq!(auth_user.user_id().unwrap(), 255);
        assert_eq!(auth_user.organization_id(), Some(3));
        assert!(!auth_user.is_api_admin());
    }

    async fn client_ip(req: Request<()>) -> ClientIp {
        let (mut parts, _) = req.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_client_ip_prefers_forwarded_header() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 172.16.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(req).await, ClientIp(Some("10.0.0.1".to_string())));
    }

    #[tokio::test]
    async fn test_client_ip_falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(client_ip(req).await, ClientIp(Some("127.0.0.1".to_string())));
    }

    #[tokio::test]
    async fn test_client_ip_missing() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(client_ip(req).await, ClientIp(None));
    }
}
