//! Shared test utilities for concierge API tests.

// Each test file uses a different subset of these helpers
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use concierge_api::http::{create_router, AppState};
use concierge_domain::{AuthorizationDecision, AuthorizationQuery, Record};
use concierge_server::oracle::{AuthorizationOracle, OracleError, OracleResult};
use concierge_storage::{MemoryRecordStore, RecordStore, StorageError, StorageResult};

/// The three demo users.
pub const ALICE: &str = "user_123";
pub const BOB: &str = "user_456";
pub const CATHY: &str = "user_789";

/// In-memory oracle holding `(subject, object)` owner grants.
#[derive(Default)]
pub struct GrantOracle {
    grants: Mutex<HashSet<(String, String)>>,
    failure: Option<OracleError>,
    calls: AtomicUsize,
}

impl GrantOracle {
    /// Each demo user owns their own profile.
    pub fn self_owned() -> Self {
        let oracle = Self::default();
        for id in [ALICE, BOB, CATHY] {
            oracle.grant(id, id);
        }
        oracle
    }

    pub fn failing(failure: OracleError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn grant(&self, requester: &str, target: &str) {
        self.grants
            .lock()
            .unwrap()
            .insert((format!("user:{requester}"), format!("profile:{target}")));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationOracle for GrantOracle {
    async fn check(&self, query: &AuthorizationQuery) -> OracleResult<AuthorizationDecision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let allowed = query.relation == "owner"
            && self
                .grants
                .lock()
                .unwrap()
                .contains(&(query.subject.to_string(), query.object.clone()));
        Ok(AuthorizationDecision::from(allowed))
    }

    fn name(&self) -> &'static str {
        "grants"
    }
}

/// Record store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn list_all(&self) -> StorageResult<Vec<Record>> {
        Err(StorageError::Internal {
            message: "connection reset".to_string(),
        })
    }

    async fn get(&self, _id: &str) -> StorageResult<Option<Record>> {
        Err(StorageError::Internal {
            message: "connection reset".to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

/// Creates an app over the seeded memory store and the given oracle.
pub fn create_test_app(oracle: Arc<dyn AuthorizationOracle>) -> axum::Router {
    let state = AppState::new(Arc::new(MemoryRecordStore::seeded()), oracle);
    create_router(state)
}

async fn into_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Body-limit rejections are plain text
    let json = if body.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::json!({ "raw_body": String::from_utf8_lossy(&body).to_string() })
        })
    };
    (status, json)
}

/// POSTs a JSON body and returns status and parsed response.
pub async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    into_json(response).await
}

/// GETs a URI and returns status and parsed response.
pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    into_json(response).await
}

/// Sends one chat message.
pub async fn chat(
    app: axum::Router,
    user_id: &str,
    message: &str,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        "/api/chat",
        serde_json::json!({ "userId": user_id, "message": message }),
    )
    .await
}
