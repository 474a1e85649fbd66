#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use platform::modules::auth::service::token_subject;
use platform::router::init_router;
use platform::state::AppState;
use platform_auth::{TokenPair, issue_token_pair};
use platform_config::{AppConfig, CorsConfig, JwtConfig, RateLimitConfig, StorageBackend};
use platform_core::hash_password_with_cost;
use platform_db::{MemoryStore, Stores};
use platform_models::{
    CreateServiceDto, NewOrganization, NewUser, Organization, Service, User, system_roles,
};

/// Low bcrypt cost keeps seeding fast in debug builds.
pub const TEST_BCRYPT_COST: u32 = 4;
pub const GUEST_EMAIL: &str = "guest@platform.local";
pub const TEST_IP: &str = "203.0.113.7";

pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub config: AppConfig,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test_access_secret_for_testing_purposes".to_string(),
        access_expiry_hours: 2,
        refresh_secret: "test_refresh_secret_for_testing_purposes".to_string(),
        refresh_expiry_hours: 168,
    }
}

/// Rate limit loose enough that no functional test trips it.
pub fn permissive_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_second: 1,
        auth_burst_size: 10_000,
    }
}

pub fn test_config(rate_limit: RateLimitConfig) -> AppConfig {
    AppConfig {
        server_address: "127.0.0.1:0".to_string(),
        context_timeout: Duration::from_secs(30),
        storage_backend: StorageBackend::Memory,
        database_url: None,
        guest_email: GUEST_EMAIL.to_string(),
        bcrypt_cost: TEST_BCRYPT_COST,
        metrics_enabled: false,
        jwt: test_jwt_config(),
        cors: CorsConfig::default(),
        rate_limit,
    }
}

pub fn setup_test_app_with_rate_limit(rate_limit: RateLimitConfig) -> TestApp {
    let config = test_config(rate_limit);
    let stores = Stores::from_backend(Arc::new(MemoryStore::new()));
    let router = init_router(AppState::new(config.clone(), stores.clone()));

    TestApp {
        router,
        stores,
        config,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_rate_limit(permissive_rate_limit_config())
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn generate_unique_service_name() -> String {
    format!("service-{}", Uuid::new_v4())
}

pub async fn create_test_organization(stores: &Stores, name: &str) -> Organization {
    stores
        .organizations
        .create_organization(NewOrganization {
            name: name.to_string(),
            role_id: Some(system_roles::MANAGER),
        })
        .await
        .unwrap()
}

pub async fn create_test_user(
    stores: &Stores,
    email: &str,
    password: &str,
    role_id: i64,
    organization_id: Option<i64>,
) -> User {
    stores
        .users
        .create(NewUser {
            email: email.to_string(),
            password_hash: hash_password_with_cost(password, TEST_BCRYPT_COST).unwrap(),
            display_name: "Test".to_string(),
            role_id,
            organization_id,
        })
        .await
        .unwrap()
}

pub async fn create_test_service(stores: &Stores, name: &str, is_marketing: bool) -> Service {
    stores
        .services
        .create(CreateServiceDto {
            name: name.to_string(),
            marketing_name: format!("{} Pro", name),
            description: "Test service".to_string(),
            app_url: "https://app.example.com".to_string(),
            icon_url: None,
            screenshot_url: None,
            tag_line: Some("Do more".to_string()),
            benefits: Some("Fast;Simple".to_string()),
            features: None,
            tags: Some("test".to_string()),
            last_update: None,
            status: Some("active".to_string()),
            price: 10.0,
            is_marketing,
        })
        .await
        .unwrap()
}

pub fn tokens_for(user: &User, config: &AppConfig) -> TokenPair {
    issue_token_pair(&token_subject(user), &config.jwt).unwrap()
}

pub fn access_token_for(user: &User, config: &AppConfig) -> String {
    tokens_for(user, config).access_token
}

pub async fn create_admin_with_token(app: &TestApp) -> (User, String) {
    let admin = create_test_user(
        &app.stores,
        &generate_unique_email(),
        "adminpass123",
        system_roles::ADMIN,
        None,
    )
    .await;
    let token = access_token_for(&admin, &app.config);
    (admin, token)
}

pub async fn create_user_with_token(app: &TestApp) -> (User, String) {
    let user = create_test_user(
        &app.stores,
        &generate_unique_email(),
        "userpass123",
        system_roles::USER,
        None,
    )
    .await;
    let token = access_token_for(&user, &app.config);
    (user, token)
}

/// Builds a request carrying the test client IP, an optional bearer token
/// and an optional JSON body.
pub fn build_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", TEST_IP);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
