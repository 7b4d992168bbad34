mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, bearer_request, cookie_request, empty_request, generate_unique_email,
    json_request, setup_test_app,
};
use gatehouse_auth::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use gatehouse_config::JwtConfig;
use gatehouse_db::UserRepository;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_register_success() {
    let app = setup_test_app();
    let email = generate_unique_email();

    let response = app.register(&email, "password1", "Ann").await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "success");

    let user = &response.body["data"]["user"];
    assert_eq!(user["email"], email);
    assert_eq!(user["name"], "Ann");
    assert_eq!(user["role"], "user");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    assert!(response.body["data"]["token"].is_string());

    let access = response.set_cookie(ACCESS_COOKIE_NAME).unwrap();
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Secure"));
    assert!(access.contains("SameSite=Strict"));
    assert!(access.contains("Path=/"));
    assert!(access.contains("Max-Age=86400"));

    let refresh = response.set_cookie(REFRESH_COOKIE_NAME).unwrap();
    assert!(refresh.contains("HttpOnly"));
    assert!(refresh.contains("Path=/api/auth/refresh"));
    assert!(refresh.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = setup_test_app();

    let first = app.register("a@x.com", "password1", "Ann").await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.register("a@x.com", "password2", "Bob").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["status"], "error");
    assert_eq!(second.message(), "Email already registered");
    assert!(second.set_cookies().is_empty());
}

#[tokio::test]
async fn test_register_email_is_case_sensitive() {
    let app = setup_test_app();

    app.register("a@x.com", "password1", "Ann").await;
    let response = app.register("A@x.com", "password1", "Ann").await;

    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = setup_test_app();

    let response = app.register("not-an-email", "short", "A").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid input data");
    let details = &response.body["details"];
    assert!(details.get("email").is_some());
    assert!(details.get("password").is_some());
    assert!(details.get("name").is_some());
}

#[tokio::test]
async fn test_register_then_login() {
    let app = setup_test_app();
    let email = generate_unique_email();

    let registered = app.register(&email, TEST_PASSWORD, "Ann").await;
    let user_id = registered.body["data"]["user"]["id"].as_str().unwrap().to_string();

    let response = app.login(&email, TEST_PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["user"]["id"], user_id.as_str());
    assert!(response.set_cookie(ACCESS_COOKIE_NAME).is_some());
    assert!(response.set_cookie(REFRESH_COOKIE_NAME).is_some());

    let token = response.body["data"]["token"].as_str().unwrap();
    let claims = app.state.tokens.current().verify(token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, email);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup_test_app();
    let email = generate_unique_email();
    app.register(&email, TEST_PASSWORD, "Ann").await;

    let wrong_password = app.login(&email, "wrong-password").await;
    let unknown_email = app.login(&generate_unique_email(), TEST_PASSWORD).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, unknown_email.status);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.message(), "Invalid credentials");
    assert!(wrong_password.set_cookies().is_empty());
}

#[tokio::test]
async fn test_login_invalid_shape() {
    let app = setup_test_app();

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "a@x.com" }),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid input data");
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = setup_test_app();
    let email = generate_unique_email();
    let login = {
        app.register(&email, TEST_PASSWORD, "Ann").await;
        app.login(&email, TEST_PASSWORD).await
    };
    let refresh_token = login.cookie_value(REFRESH_COOKIE_NAME).unwrap();

    let response = app
        .send(cookie_request(
            "POST",
            "/api/auth/refresh",
            REFRESH_COOKIE_NAME,
            &refresh_token,
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["data"]["token"].as_str().unwrap();
    assert_eq!(
        response.cookie_value(ACCESS_COOKIE_NAME).as_deref(),
        Some(token)
    );
    // Only the access cookie is reissued.
    assert!(response.set_cookie(REFRESH_COOKIE_NAME).is_none());

    let claims = app.state.tokens.current().verify(token).unwrap();
    assert_eq!(claims.email, email);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = setup_test_app();

    let response = app.send(empty_request("POST", "/api/auth/refresh")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Refresh token required");
}

#[tokio::test]
async fn test_refresh_with_invalid_token() {
    let app = setup_test_app();

    let response = app
        .send(cookie_request(
            "POST",
            "/api/auth/refresh",
            REFRESH_COOKIE_NAME,
            "not.a.token",
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_for_deleted_user_is_unauthorized() {
    let app = setup_test_app();
    let registered = app
        .register(&generate_unique_email(), TEST_PASSWORD, "Ann")
        .await;
    let refresh_token = registered.cookie_value(REFRESH_COOKIE_NAME).unwrap();
    let user_id =
        Uuid::parse_str(registered.body["data"]["user"]["id"].as_str().unwrap()).unwrap();

    assert!(app.users.delete(user_id).await.unwrap());

    let response = app
        .send(cookie_request(
            "POST",
            "/api/auth/refresh",
            REFRESH_COOKIE_NAME,
            &refresh_token,
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid refresh token");
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let app = setup_test_app();
    let (_, token) = app.create_user().await;

    let response = app
        .send(bearer_request("POST", "/api/auth/logout", &token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "Successfully logged out");

    for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
        let cookie = response.set_cookie(name).unwrap();
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"), "{cookie}");
    }
    assert!(
        response
            .set_cookie(REFRESH_COOKIE_NAME)
            .unwrap()
            .contains("Path=/api/auth/refresh")
    );
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = setup_test_app();

    let response = app.send(empty_request("POST", "/api/auth/logout")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.set_cookies().len(), 2);
}

#[tokio::test]
async fn test_secret_rotation_invalidates_existing_tokens() {
    let app = setup_test_app();
    let (_, old_token) = app.create_user().await;

    let before = app
        .send(bearer_request("GET", "/api/users/me", &old_token))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    app.state
        .tokens
        .rotate(&JwtConfig::new("a-completely-different-secret"));

    let after = app
        .send(bearer_request("GET", "/api/users/me", &old_token))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.message(), "Invalid or expired token");

    let (_, new_token) = app.create_user().await;
    let fresh = app
        .send(bearer_request("GET", "/api/users/me", &new_token))
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
}
