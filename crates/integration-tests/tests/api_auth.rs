mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn register_then_login() {
    let app = TestApp::new();
    let credentials = json!({ "username": "john_doe", "password": "password123" });

    let (status, body) = app.request(Method::POST, "/api/users/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "john_doe");
    assert!(body["user"].get("password").is_none());

    let (status, body) = app.request(Method::POST, "/api/users/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    let identity = app.state.users.authenticate(token).unwrap();
    assert_eq!(identity.username, "john_doe");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new();
    app.user("jane_doe").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "jane_doe", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_is_validated() {
    let app = TestApp::new();
    for body in [
        json!({ "username": "jo", "password": "password123" }),
        json!({ "username": "a_very_long_username", "password": "password123" }),
        json!({ "username": "jack_doe", "password": "12345" }),
        json!({}),
    ] {
        let (status, body) = app.request(Method::POST, "/api/users/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = TestApp::new();
    app.request(
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "username": "john_doe", "password": "password123" })),
    )
    .await;

    for body in [
        json!({ "username": "john_doe", "password": "not-it" }),
        json!({ "username": "nobody", "password": "password123" }),
    ] {
        let (status, body) = app.request(Method::POST, "/api/users/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("Invalid username or password"));
    }
}
