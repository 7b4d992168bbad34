#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use gatehouse::router::init_router;
use gatehouse::state::{AppConfig, AppState};
use gatehouse_config::{CookieConfig, CorsConfig, JwtConfig, PasswordConfig, ServerConfig};
use gatehouse_core::UserRole;
use gatehouse_db::{InMemoryUserRepository, UserRepository};
use gatehouse_models::UserUpdate;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// All `Set-Cookie` header values.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }

    /// The `Set-Cookie` value for cookie `name`.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.set_cookies()
            .into_iter()
            .find(|cookie| cookie.starts_with(&prefix))
    }

    /// Just the value of cookie `name`, as a client would store it.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        let cookie = self.set_cookie(name)?;
        let pair = cookie.split(';').next()?;
        pair.split_once('=').map(|(_, value)| value.to_string())
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub fn test_config() -> AppConfig {
    let no_vars = |_: &str| None::<String>;
    AppConfig {
        jwt: JwtConfig::new(TEST_SECRET),
        cookie: CookieConfig::default(),
        password: PasswordConfig { bcrypt_cost: 4 },
        cors: CorsConfig::from_vars(no_vars),
        server: ServerConfig::from_vars(no_vars),
        database_url: None,
    }
}

pub fn setup_test_app() -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let state = AppState::new(users.clone(), &test_config());
    TestApp {
        router: init_router(state.clone()),
        state,
        users,
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn cookie_request(method: &str, uri: &str, name: &str, value: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("{}={}", name, value))
        .body(Body::empty())
        .unwrap()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": email, "password": password, "name": name }),
        ))
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
    }

    /// Registers a fresh user and returns `(id, access token)`.
    pub async fn create_user(&self) -> (Uuid, String) {
        let response = self
            .register(&generate_unique_email(), TEST_PASSWORD, "Test User")
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        let id = response.body["data"]["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap();
        let token = response.body["data"]["token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Registers a user, promotes it to admin and logs in again so the token
    /// carries the new role.
    pub async fn create_admin(&self) -> (Uuid, String) {
        let email = generate_unique_email();
        let response = self.register(&email, TEST_PASSWORD, "Test Admin").await;
        let id = Uuid::parse_str(response.body["data"]["user"]["id"].as_str().unwrap()).unwrap();

        self.users
            .update(
                id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let login = self.login(&email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);
        let token = login.body["data"]["token"].as_str().unwrap().to_string();
        (id, token)
    }
}
