#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use podium::modules::events::store::InMemoryEventStore;
use podium::modules::users::model::{NewUser, User};
use podium::modules::users::store::InMemoryUserStore;
use podium::router::init_router;
use podium::state::AppState;
use podium_auth::{Role, SessionIdentity, issue_session_token};
use podium_config::{AuthConfig, CorsConfig, RateLimitConfig};
use podium_core::hash_password_with_cost;
use serde_json::{Value, json};

pub const TEST_PASSWORD: &str = "testpass123";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        secret: "integration-test-secret".to_string(),
        password_hash_cost: 4,
        ..AuthConfig::default()
    }
}

pub fn test_state_with_limits(rate_limit: RateLimitConfig) -> AppState {
    AppState::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryEventStore::new()),
        test_auth_config(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        &rate_limit,
    )
}

pub fn test_state() -> AppState {
    test_state_with_limits(RateLimitConfig {
        auth_per_minute: 1_000,
        auth_burst_size: 1_000,
        ..RateLimitConfig::default()
    })
}

pub fn setup_test_app() -> (Router, AppState) {
    let state = test_state();
    (init_router(state.clone()), state)
}

pub async fn create_test_user(
    state: &AppState,
    email: &str,
    role: Role,
    onboarding_completed: bool,
) -> User {
    let password_hash = hash_password_with_cost(TEST_PASSWORD, 4).unwrap();

    state
        .users
        .create_user(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash,
            role,
            onboarding_completed,
        })
        .await
        .unwrap()
}

/// A signed token for an identity that need not exist in the store.
pub fn token_for(role: Role, onboarding_completed: bool) -> String {
    let identity = SessionIdentity::new("token-only-user", role, onboarding_completed);
    issue_session_token(&identity, &test_auth_config()).unwrap()
}

pub fn token_for_user(user: &User) -> String {
    issue_session_token(&user.identity(), &test_auth_config()).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    json_request("POST", uri, body, token)
}

pub fn put_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    json_request("PUT", uri, body, token)
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Mark a request as arriving from `peer`, the way `into_make_service_with_connect_info` does.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = format!("{}:40000", peer).parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

/// A complete onboarding profile body.
pub fn profile_body(first_name: &str, last_name: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": last_name,
        "birthDate": "1990-12-10T00:00:00Z",
        "gender": "FEMALE",
        "country": "United Kingdom",
        "city": "London",
        "address": "12 St James's Square",
        "phone": "+44 20 7946 0000",
        "emergencyContact": "Mary Somerville",
        "emergencyPhone": "+44 20 7946 0001",
        "bloodType": "O+",
        "documentType": "PASSPORT",
        "documentNumber": "P1234567",
        "acceptTerms": true
    })
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location header")
        .to_str()
        .unwrap()
}

/// The session cookie from a `Set-Cookie` header, as `name=value`.
pub fn session_cookie_pair(response: &Response<Body>) -> Option<String> {
    let cookie_name = test_auth_config().cookie_name;
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", cookie_name)))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}
