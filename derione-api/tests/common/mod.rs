//! Test harness: router over an in-memory store

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use derione_api::db::MemoryStore;
use derione_api::{AppState, Config, api};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const API_KEY: &str = "test-key";

/// Config with test defaults, plus `overrides`
pub fn config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DB_HOST".to_string(), "127.0.0.1".to_string()),
        ("API_KEY".to_string(), API_KEY.to_string()),
    ]);
    for (k, v) in overrides {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub fn app_with(store: MemoryStore, overrides: &[(&str, &str)]) -> Router {
    let state = AppState::with_store(&config(overrides), Arc::new(store)).unwrap();
    api::create_router(state)
}

pub fn app(store: MemoryStore) -> Router {
    app_with(store, &[])
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_key(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, key: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(body.into()).unwrap()
}
