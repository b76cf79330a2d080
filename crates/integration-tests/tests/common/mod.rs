//! Shared wiring for the HTTP-level tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use api_adapters::{router, AppState, Ports};
use auth_adapters::{Argon2Hasher, JwtIssuer};
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use domains::{TokenIssuer, User, UserRepository};
use serde_json::Value;
use storage_adapters::MemoryStore;
use tower::ServiceExt;

pub const PEER: &str = "1.2.3.4";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<JwtIssuer>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(JwtIssuer::new(b"integration-secret", chrono::Duration::hours(1)));
        let state = AppState::new(Ports {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            votes: store.clone(),
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: tokens.clone(),
        });
        let router = router(state.clone());
        Self { store, tokens, state, router }
    }

    /// Creates an account directly in storage and returns it with a valid token.
    pub async fn user(&self, username: &str) -> (User, String) {
        let user = UserRepository::create(self.store.as_ref(), username, "not-a-real-hash")
            .await
            .unwrap();
        let token = self.tokens.issue(&user).unwrap();
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let mut request = builder.body(body).unwrap();
        let addr: SocketAddr = format!("{PEER}:50000").parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
