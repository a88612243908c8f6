#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use slotbook_api::{ApiState, router};
use slotbook_core::{Scheduler, memory::MemoryStore};
use tower::ServiceExt;

pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let scheduler = Scheduler::new(Arc::new(store.clone()));
        Self {
            app: build_app(scheduler),
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(&self.app, request).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Request::delete(uri).body(Body::empty()).unwrap()).await
    }
}

pub fn build_app(scheduler: Scheduler) -> Router {
    router(Arc::new(ApiState { scheduler }))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
