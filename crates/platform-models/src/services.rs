//! Service catalogue models and projections.
//!
//! A service row carries everything the catalogue, hub and marketing pages
//! need. Each audience gets its own projection. `benefits`, `features` and
//! `tags` are stored as `;`-delimited strings and split on the way out.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const LIST_DELIMITER: char = ';';

/// Path segments routed ahead of `/services/{id}`. A service with one of
/// these names could never be fetched by name.
pub const RESERVED_SERVICE_NAMES: [&str; 2] = ["marketing", "heartbeat"];

/// Service names double as path identifiers, so they must not collide with
/// a fixed route or parse as a numeric id.
fn validate_service_name(name: &str) -> Result<(), ValidationError> {
    if RESERVED_SERVICE_NAMES.contains(&name) {
        return Err(ValidationError::new("reserved_name")
            .with_message(format!("name '{name}' is reserved").into()));
    }
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new("numeric_name")
            .with_message("name must not be all digits".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub marketing_name: String,
    pub description: String,
    pub app_url: String,
    pub icon_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub tag_line: Option<String>,
    pub benefits: Option<String>,
    pub features: Option<String>,
    pub tags: Option<String>,
    pub last_update: Option<String>,
    pub status: Option<String>,
    pub price: f64,
    pub is_marketing: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Catalogue entry returned by list/detail reads and by `use`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicService {
    pub id: i64,
    pub name: String,
    pub app_url: String,
    pub last_update: Option<String>,
    pub status: Option<String>,
}

impl From<Service> for PublicService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            app_url: service.app_url,
            last_update: service.last_update,
            status: service.status,
        }
    }
}

/// Card shown in an organization's hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HubService {
    pub id: i64,
    pub name: String,
    pub icon_url: Option<String>,
    pub description: String,
    pub screenshot_url: Option<String>,
    pub last_update: Option<String>,
    pub status: Option<String>,
    pub price: f64,
}

impl From<Service> for HubService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            icon_url: service.icon_url,
            description: service.description,
            screenshot_url: service.screenshot_url,
            last_update: service.last_update,
            status: service.status,
            price: service.price,
        }
    }
}

/// Marketing-site entry with the delimited fields expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MarketingService {
    pub id: i64,
    pub icon_url: Option<String>,
    pub marketing_name: String,
    pub tag_line: Option<String>,
    pub description: String,
    pub benefits: Vec<String>,
    pub features: Vec<String>,
    pub tags: Vec<String>,
}

impl From<Service> for MarketingService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            icon_url: service.icon_url,
            marketing_name: service.marketing_name,
            tag_line: service.tag_line,
            description: service.description,
            benefits: split_delimited(service.benefits.as_deref()),
            features: split_delimited(service.features.as_deref()),
            tags: split_delimited(service.tags.as_deref()),
        }
    }
}

/// Splits a `;`-delimited column, trimming entries and dropping empty ones.
pub fn split_delimited(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Result of starting a usage session: the service snapshot plus the usage
/// log id that subsequent heartbeats reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UseService {
    pub service: PublicService,
    pub log_id: i64,
}

/// Heartbeat payload: seconds of use to add to an open usage log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct HeartbeatRequest {
    pub log_id: i64,
    #[schema(example = 30)]
    pub duration: i64,
}

/// DTO for creating a service.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceDto {
    #[validate(length(min = 1, max = 255), custom(function = "validate_service_name"))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub marketing_name: String,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(url)]
    pub app_url: String,
    pub icon_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub tag_line: Option<String>,
    pub benefits: Option<String>,
    pub features: Option<String>,
    pub tags: Option<String>,
    pub last_update: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub is_marketing: bool,
}

/// DTO for updating a service. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceDto {
    #[validate(length(min = 1, max = 255), custom(function = "validate_service_name"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub marketing_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,
    #[validate(url)]
    pub app_url: Option<String>,
    pub icon_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub tag_line: Option<String>,
    pub benefits: Option<String>,
    pub features: Option<String>,
    pub tags: Option<String>,
    pub last_update: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub is_marketing: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service() -> Service {
        Service {
            id: 9,
            name: "scheduler".to_string(),
            marketing_name: "Scheduler Pro".to_string(),
            description: "Shift planning".to_string(),
            app_url: "https://scheduler.example.com".to_string(),
            icon_url: Some("https://cdn.example.com/s.png".to_string()),
            screenshot_url: None,
            tag_line: Some("Plan less".to_string()),
            benefits: Some("Fast; Simple ;;Cheap".to_string()),
            features: None,
            tags: Some("hr".to_string()),
            last_update: Some("2024-01-01".to_string()),
            status: Some("active".to_string()),
            price: 9.5,
            is_marketing: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_service_name_rules() {
        assert!(validate_service_name("scheduler").is_ok());
        assert!(validate_service_name("crm2").is_ok());
        assert!(validate_service_name("marketing-suite").is_ok());

        let err = validate_service_name("marketing").unwrap_err();
        assert_eq!(err.code, "reserved_name");
        assert_eq!(err.message.as_deref(), Some("name 'marketing' is reserved"));
        assert!(validate_service_name("heartbeat").is_err());
        assert_eq!(
            validate_service_name("12345").unwrap_err().code,
            "numeric_name"
        );
    }

    #[test]
    fn test_update_dto_checks_name_only_when_present() {
        assert!(UpdateServiceDto::default().validate().is_ok());

        let rename = UpdateServiceDto {
            name: Some("heartbeat".to_string()),
            ..Default::default()
        };
        assert!(rename.validate().is_err());
    }

    #[test]
    fn test_split_delimited() {
        assert_eq!(
            split_delimited(Some("Fast; Simple ;;Cheap")),
            vec!["Fast", "Simple", "Cheap"]
        );
        assert!(split_delimited(None).is_empty());
        assert!(split_delimited(Some("")).is_empty());
    }

    #[test]
    fn test_marketing_projection() {
        let marketing = MarketingService::from(service());
        assert_eq!(marketing.marketing_name, "Scheduler Pro");
        assert_eq!(marketing.benefits.len(), 3);
        assert!(marketing.features.is_empty());
        assert_eq!(marketing.tags, vec!["hr"]);
    }

    #[test]
    fn test_public_projection() {
        let public = PublicService::from(service());
        assert_eq!(public.id, 9);
        assert_eq!(public.status.as_deref(), Some("active"));
    }

    #[test]
    fn test_hub_projection_keeps_price() {
        let hub = HubService::from(service());
        assert_eq!(hub.price, 9.5);
    }
}
