//! # Platform Core
//!
//! Core types, errors, and utilities shared by every platform crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: bcrypt hashing and credential verification
//! - [`identifier`]: Classification of path identifiers into lookup strategies
//! - [`deadline`]: Per-operation deadline wrapper
//!
//! # Example
//!
//! ```ignore
//! use platform_core::{AppError, EntityIdentifier, hash_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//! let hash = hash_password("secure_password")?;
//!
//! match EntityIdentifier::parse("42")? {
//!     EntityIdentifier::Id(id) => println!("lookup by id {id}"),
//!     EntityIdentifier::Natural(key) => println!("lookup by {key}"),
//! }
//! ```

pub mod deadline;
pub mod errors;
pub mod identifier;
pub mod password;

// Re-export commonly used types at crate root
pub use deadline::with_deadline;
pub use errors::{AppError, ErrorResponse};
pub use identifier::{EntityIdentifier, UsageLogIdentifier};
pub use password::{
    hash_password, hash_password_blocking, hash_password_with_cost, verify_credentials,
    verify_password,
};
