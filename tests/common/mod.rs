//! Shared utilities for integration testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use wayfare::notify::{Notifier, NotifyError};
use wayfare::store::MemoryStore;
use wayfare::{AppConfig, Server};

/// Notifier that records every published message.
#[derive(Default)]
pub struct RecordingNotifier {
    pub published: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, message: Value) -> Result<(), NotifyError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), message));
        Ok(())
    }
}

/// Build a servable router over an in-memory store and a recording
/// notifier.
pub fn test_router(config: AppConfig) -> (Router, Arc<MemoryStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let server = Server::with_collaborators(config, store.clone(), notifier.clone());
    (server.router().unwrap(), store, notifier)
}

/// Drive one request through the router, returning status and JSON body.
pub async fn call(router: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    call_with_headers(router, path, body, &[]).await
}

/// Like [`call`], with extra request headers.
pub async fn call_with_headers(
    router: &Router,
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri(path);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
