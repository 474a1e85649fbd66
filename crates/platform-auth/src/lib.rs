//! # Platform Auth
//!
//! Session token types and JWT utilities.
//!
//! - [`claims`]: Claim layout shared by access and refresh tokens
//! - [`jwt`]: Token issuance, validation and subject extraction
//!
//! # Token Types
//!
//! - **Access Token**: short-lived, signed with the access secret, authorizes API calls
//! - **Refresh Token**: long-lived, signed with the refresh secret, mints new pairs
//!
//! Both carry the subject's role, organization and organization-role ids plus
//! the `api_admin` flag. Authorization decisions read those claims only after
//! the signature has been verified.

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{Claims, TokenSubject, TokenUse};
pub use jwt::{
    TokenPair, create_access_token, create_refresh_token, extract_subject_id, issue_token_pair,
    validate_token, verify_access_token, verify_refresh_token,
};
