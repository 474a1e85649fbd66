//! Request extractors for cross-cutting concerns.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`AuthUser`](auth::AuthUser) verifies the access token and exposes its claims
//! 3. [`RequireApiAdmin`](auth::RequireApiAdmin) additionally requires the
//!    verified `api_admin` claim
//! 4. Handler executes if all checks pass
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireApiAdmin};
//!
//! // Any valid access token
//! async fn list_services(_auth_user: AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! // Admin-only
//! async fn delete_service(RequireApiAdmin(admin): RequireApiAdmin) -> impl IntoResponse {
//!     // Only executes if the verified token carries api_admin = true
//! }
//! ```

pub mod auth;
