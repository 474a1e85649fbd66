mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    GUEST_EMAIL, TEST_IP, build_request, create_test_user, generate_unique_email, send,
    setup_test_app, tokens_for,
};
use platform_auth::{TokenUse, verify_access_token, verify_refresh_token};
use platform_models::system_roles;

#[tokio::test]
async fn test_login_success_returns_token_pair() {
    let app = setup_test_app();
    let email = generate_unique_email();
    let password = "testpass123";
    let user = create_test_user(&app.stores, &email, password, system_roles::USER, None).await;

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let access = body["access_token"].as_str().unwrap();
    let refresh = body["refresh_token"].as_str().unwrap();
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_ne!(access, refresh);

    let claims = verify_access_token(access, &app.config.jwt).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.user_role_id, system_roles::USER);
    assert!(!claims.api_admin);

    let refresh_claims = verify_refresh_token(refresh, &app.config.jwt).unwrap();
    assert_eq!(refresh_claims.token_use, TokenUse::Refresh);
    assert_eq!(refresh_claims.user_id().unwrap(), user.id);
}

#[tokio::test]
async fn test_login_records_exactly_one_audit_entry() {
    let app = setup_test_app();
    let email = generate_unique_email();
    let user = create_test_user(&app.stores, &email, "secret123", system_roles::USER, None).await;

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "secret123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let logs = app.stores.audit.list_by_user(user.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "login");
    assert_eq!(logs[0].ip_address.as_deref(), Some(TEST_IP));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = setup_test_app();
    let email = generate_unique_email();
    let user = create_test_user(&app.stores, &email, "rightpass1", system_roles::USER, None).await;

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "wrongpass1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Password does not match");
    assert!(app.stores.audit.list_by_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_unknown_email_is_not_found() {
    let app = setup_test_app();

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": "nobody@test.com", "password": "whatever1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User email not found");
}

#[tokio::test]
async fn test_login_archived_user_is_not_found() {
    let app = setup_test_app();
    let email = generate_unique_email();
    let user = create_test_user(&app.stores, &email, "secret123", system_roles::USER, None).await;
    app.stores.users.archive(user.id).await.unwrap();

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "secret123" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = setup_test_app();

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": "someone@test.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password is required");
}

#[tokio::test]
async fn test_login_invalid_email_format() {
    let app = setup_test_app();

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "secret123" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_login_carries_api_admin_claim() {
    let app = setup_test_app();
    let email = generate_unique_email();
    create_test_user(&app.stores, &email, "adminpass1", system_roles::ADMIN, None).await;

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "adminpass1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let claims =
        verify_access_token(body["access_token"].as_str().unwrap(), &app.config.jwt).unwrap();
    assert!(claims.api_admin);
}

#[tokio::test]
async fn test_guest_login() {
    let app = setup_test_app();
    let guest = create_test_user(
        &app.stores,
        GUEST_EMAIL,
        "guestpass1",
        system_roles::GUEST,
        None,
    )
    .await;

    let (status, body) = send(
        &app.router,
        build_request("POST", "/public/login-guest", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let claims =
        verify_access_token(body["access_token"].as_str().unwrap(), &app.config.jwt).unwrap();
    assert_eq!(claims.user_id().unwrap(), guest.id);
    assert_eq!(claims.user_role_id, system_roles::GUEST);
    assert!(!claims.api_admin);
    assert!(verify_refresh_token(body["refresh_token"].as_str().unwrap(), &app.config.jwt).is_ok());

    let logs = app.stores.audit.list_by_user(guest.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "login_guest");
    assert_eq!(logs[0].ip_address.as_deref(), Some(TEST_IP));
}

#[tokio::test]
async fn test_guest_login_without_guest_account_is_internal_error() {
    let app = setup_test_app();

    let (status, body) = send(
        &app.router,
        build_request("POST", "/public/login-guest", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_refresh_token_issues_new_pair() {
    let app = setup_test_app();
    let user = create_test_user(
        &app.stores,
        &generate_unique_email(),
        "secret123",
        system_roles::USER,
        None,
    )
    .await;
    let pair = tokens_for(&user, &app.config);

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/refresh-token",
            None,
            Some(json!({ "refresh_token": pair.refresh_token })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let claims =
        verify_access_token(body["access_token"].as_str().unwrap(), &app.config.jwt).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);

    let logs = app.stores.audit.list_by_user(user.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "refresh");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = setup_test_app();
    let user = create_test_user(
        &app.stores,
        &generate_unique_email(),
        "secret123",
        system_roles::USER,
        None,
    )
    .await;
    let pair = tokens_for(&user, &app.config);

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/refresh-token",
            None,
            Some(json!({ "refresh_token": pair.access_token })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_archived_user() {
    let app = setup_test_app();
    let user = create_test_user(
        &app.stores,
        &generate_unique_email(),
        "secret123",
        system_roles::USER,
        None,
    )
    .await;
    let pair = tokens_for(&user, &app.config);
    app.stores.users.archive(user.id).await.unwrap();

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/refresh-token",
            None,
            Some(json!({ "refresh_token": pair.refresh_token })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User is no longer active");
}

#[tokio::test]
async fn test_reset_password_then_login() {
    let app = setup_test_app();
    let email = generate_unique_email();
    create_test_user(&app.stores, &email, "oldpass123", system_roles::USER, None).await;

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/reset-password",
            None,
            Some(json!({ "email": email, "new_password": "newpass123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "oldpass123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        build_request(
            "POST",
            "/public/login",
            None,
            Some(json!({ "email": email, "password": "newpass123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_unknown_email() {
    let app = setup_test_app();

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/reset-password",
            None,
            Some(json!({ "email": "nobody@test.com", "new_password": "newpass123" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User email not found");
}

#[tokio::test]
async fn test_forgot_password_always_succeeds() {
    let app = setup_test_app();

    let (status, body) = send(
        &app.router,
        build_request(
            "POST",
            "/public/forgot-password",
            None,
            Some(json!({ "email": "nobody@test.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("If an account exists"));
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app();

    let (status, body) = send(&app.router, build_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
