mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{build_request, create_user_with_token, setup_test_app_with_rate_limit};
use platform_config::RateLimitConfig;

/// One request per client, replenished once a minute.
fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_second: 60,
        auth_burst_size: 1,
    }
}

fn login_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/public/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": "test@example.com",
                "password": "password123"
            }))
            .unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_auth_rate_limit_exceeded() {
    let app = setup_test_app_with_rate_limit(strict_rate_limit_config());

    // Unknown email, but the request is processed.
    let response1 = app
        .router
        .clone()
        .oneshot(login_request("192.168.1.100"))
        .await
        .unwrap();
    assert_eq!(response1.status(), StatusCode::NOT_FOUND);

    let response2 = app
        .router
        .clone()
        .oneshot(login_request("192.168.1.100"))
        .await
        .unwrap();
    assert_eq!(response2.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_different_ips_have_separate_limits() {
    let app = setup_test_app_with_rate_limit(strict_rate_limit_config());

    let response1 = app
        .router
        .clone()
        .oneshot(login_request("10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(response1.status(), StatusCode::NOT_FOUND);

    let response2 = app
        .router
        .clone()
        .oneshot(login_request("10.0.0.2"))
        .await
        .unwrap();
    assert_eq!(response2.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_private_routes_are_not_rate_limited() {
    let app = setup_test_app_with_rate_limit(strict_rate_limit_config());
    let (_, token) = create_user_with_token(&app).await;

    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(build_request("GET", "/private/users", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
