//! User domain models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Well-known user role ids. `users.role_id` is a plain column with no
/// roles table behind it; the migration documents the same ids.
pub mod system_roles {
    pub const ADMIN: i64 = 1;
    pub const MANAGER: i64 = 2;
    pub const USER: i64 = 3;
    pub const GUEST: i64 = 4;

    /// Admins get the `api_admin` claim in their tokens.
    pub fn is_admin(role_id: i64) -> bool {
        role_id == ADMIN
    }
}

/// A stored identity.
///
/// `organization_name` and `organization_role_id` are joined from the user's
/// organization so tokens can be issued without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role_id: i64,
    pub organization_id: Option<i64>,
    pub organization_name: Option<String>,
    pub organization_role_id: Option<i64>,
    pub is_archived: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// User projection safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub organization_id: Option<i64>,
    pub organization_name: Option<String>,
    pub role_id: i64,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            organization_id: user.organization_id,
            organization_name: user.organization_name,
            role_id: user.role_id,
        }
    }
}

/// Store input for a new user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role_id: i64,
    pub organization_id: Option<i64>,
}

/// Partial update applied by the store. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub organization_id: Option<i64>,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_role")]
    pub role_id: i64,
    pub organization_id: Option<i64>,
}

fn default_role() -> i64 {
    system_roles::USER
}

/// DTO for updating a user. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub organization_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_public_user_drops_secrets() {
        let user = User {
            id: 1,
            email: "a@b.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            display_name: "Ada".to_string(),
            role_id: system_roles::USER,
            organization_id: Some(2),
            organization_name: Some("Acme".to_string()),
            organization_role_id: Some(1),
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));

        let public = PublicUser::from(user);
        assert_eq!(public.organization_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_create_user_dto_defaults_role() {
        let dto: CreateUserDto =
            serde_json::from_str(r#"{"email":"a@b.com","password":"password1"}"#).unwrap();
        assert_eq!(dto.role_id, system_roles::USER);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto: CreateUserDto =
            serde_json::from_str(r#"{"email":"nope","password":"short"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_is_admin() {
        assert!(system_roles::is_admin(system_roles::ADMIN));
        assert!(!system_roles::is_admin(system_roles::GUEST));
    }
}
