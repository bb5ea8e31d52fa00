//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;

use concierge_domain::{DomainError, Identity, ProfileView, Record};
use concierge_server::handlers::gateway::{GatewayFailure, Outcome};
use concierge_storage::StorageError;

use super::state::AppState;
use crate::middleware::{cors_layer, HttpMetricsLayer, RequestTraceLayer};
use crate::observability::{metrics_handler, MetricsState};

/// JSON extractor that rejects malformed bodies with 400 `validation_error`
/// instead of axum's 422.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBadRequest(value)),
            Err(rejection) => {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    Err(ApiError::payload_too_large(rejection.body_text()))
                } else {
                    Err(ApiError::validation_error(rejection.body_text()))
                }
            }
        }
    }
}

/// Default request body size limit (64 KiB). Chat messages are short.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/profile/:target_user_id", get(get_profile))
        .route("/api/users", get(list_users))
}

/// Creates the HTTP router with the default body size limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    api_routes()
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
        .layer(HttpMetricsLayer::new())
        .layer(RequestTraceLayer::new())
}

/// Creates the HTTP router plus `/metrics`.
pub fn create_router_with_observability(state: AppState, metrics_state: MetricsState) -> Router {
    create_router_with_observability_and_limit(state, metrics_state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router plus `/metrics` with a custom body size limit.
pub fn create_router_with_observability_and_limit(
    state: AppState,
    metrics_state: MetricsState,
    body_limit: usize,
) -> Router {
    let api_router = api_routes()
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(body_limit));

    let observability_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .with_state(metrics_state);

    api_router
        .merge(observability_router)
        .layer(cors_layer())
        .layer(HttpMetricsLayer::new())
        .layer(RequestTraceLayer::new())
}

// ============================================================
// Error Handling
// ============================================================

/// Error codes carried in the `code` field of error bodies.
pub mod error_codes {
    /// Missing or malformed input (400).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// The oracle denied access to the profile (403).
    pub const NOT_AUTHORIZED: &str = "not_authorized";
    /// Access was granted but the profile does not exist (404).
    pub const PROFILE_NOT_FOUND: &str = "profile_not_found";
    /// Request body exceeds the size limit (413).
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// No authorization decision could be obtained (503).
    pub const AUTHORIZATION_UNAVAILABLE: &str = "authorization_unavailable";
    /// The record store failed (503).
    pub const STORAGE_UNAVAILABLE: &str = "storage_unavailable";
    /// Unexpected internal error (500).
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::new(error_codes::NOT_AUTHORIZED, message)
    }

    pub fn profile_not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::PROFILE_NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(error_codes::PAYLOAD_TOO_LARGE, message)
    }

    pub fn authorization_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::AUTHORIZATION_UNAVAILABLE, message)
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::STORAGE_UNAVAILABLE, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// HTTP status for this error's code.
    pub fn status(&self) -> StatusCode {
        use error_codes::*;

        match self.code.as_str() {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            NOT_AUTHORIZED => StatusCode::FORBIDDEN,
            PROFILE_NOT_FOUND => StatusCode::NOT_FOUND,
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            AUTHORIZATION_UNAVAILABLE | STORAGE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Details stay in the log
        error!(error = %err, "Record store error");
        ApiError::storage_unavailable("profile storage is unavailable")
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Parses a user id from the request into a requester identity.
fn parse_user_id(field: &str, value: Option<&str>) -> ApiResult<Identity> {
    match value.map(str::trim) {
        None | Some("") => Err(ApiError::validation_error(format!("{field} is required"))),
        Some(id) => Identity::user(id)
            .map_err(|e| ApiError::validation_error(format!("invalid {field}: {e}"))),
    }
}

// ============================================================
// Health
// ============================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Chat
// ============================================================

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Response body for `POST /api/chat`.
///
/// `profile` is present only for answers and carries the four disclosed
/// fields.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub class: &'static str,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileView>,
}

impl From<Outcome> for ChatResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            class: outcome.class().as_str(),
            reply: outcome.reply(),
            profile: outcome.record().map(Record::view),
        }
    }
}

/// Every gateway outcome, refusals and failures included, is a 200 chat
/// reply. Only unusable input is an HTTP error.
async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBadRequest(body): JsonBadRequest<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let requester = parse_user_id("userId", Some(&body.user_id))?;
    let outcome = state.gateway.handle(&requester, &body.message).await;
    Ok(Json(ChatResponse::from(outcome)))
}

// ============================================================
// Profiles
// ============================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    pub current_user_id: Option<String>,
}

/// Maps a direct profile lookup outcome onto an HTTP response.
fn profile_response(outcome: Outcome) -> ApiResult<Json<ProfileView>> {
    let reply = outcome.reply();
    match outcome {
        Outcome::Answer(record) => Ok(Json(record.view())),
        Outcome::Refusal(_) => Err(ApiError::not_authorized(reply)),
        Outcome::Failure(GatewayFailure::RecordNotFound) => {
            Err(ApiError::profile_not_found(reply))
        }
        Outcome::Failure(GatewayFailure::AuthorizationUnavailable) => {
            Err(ApiError::authorization_unavailable(reply))
        }
        Outcome::Failure(GatewayFailure::RecordUnavailable) => {
            Err(ApiError::storage_unavailable(reply))
        }
        // check_profile skips resolution and never produces guidance
        Outcome::Guidance(_) => Err(ApiError::internal_error("unexpected guidance outcome")),
    }
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(target_user_id): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Json<ProfileView>> {
    let requester = parse_user_id("currentUserId", query.current_user_id.as_deref())?;
    let target = parse_user_id("target user id", Some(&target_user_id))?;
    profile_response(state.gateway.check_profile(&requester, target.id()).await)
}

// ============================================================
// Users
// ============================================================

/// Entry in the user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

/// Lists selectable users by id and name. No profile fields are exposed.
async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserSummary>>> {
    let records = state.store().list_all().await?;

    Ok(Json(
        records
            .into_iter()
            .map(|record| UserSummary {
                id: record.id,
                name: record.name,
            })
            .collect(),
    ))
}
