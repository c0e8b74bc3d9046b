//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;

use grantor_domain::error::DomainError;
use grantor_domain::model::Permission;
use grantor_storage::AuthStore;

use super::state::AppState;

/// Header carrying the caller's identity. Authenticating the header value is
/// the transport layer's responsibility, not this service's.
pub const CALLER_HEADER: &str = "x-user-id";

/// Default request body size limit (1MB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Custom JSON extractor that returns 400 Bad Request instead of 422
/// Unprocessable Entity for deserialization errors.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBadRequest(value)),
            Err(rejection) => {
                let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };

                let message = rejection.body_text();
                let body = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::new(error_codes::PAYLOAD_TOO_LARGE, message)
                } else {
                    ApiError::validation_error(message)
                };

                Err((status, Json(body)))
            }
        }
    }
}

/// Creates the HTTP router with all endpoints and the default body limit.
pub fn create_router<S: AuthStore>(state: AppState<S>) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit<S: AuthStore>(
    state: AppState<S>,
    body_limit: usize,
) -> Router {
    let shared_state = Arc::new(state);
    Router::new()
        // Group lifecycle
        .route("/groups", post(create_group::<S>).get(list_groups::<S>))
        .route(
            "/groups/:uuid",
            get(get_group::<S>).delete(delete_group::<S>),
        )
        .route("/groups/:uuid/members", post(add_group_member::<S>))
        // Grants
        .route(
            "/groups/:uuid/permissions",
            post(grant_group_permission::<S>).get(get_group_permissions::<S>),
        )
        .route(
            "/groups/:uuid/permissions/revoke",
            post(revoke_group_permission::<S>),
        )
        .route(
            "/users/:user_id/permissions",
            post(grant_user_permission::<S>),
        )
        .route(
            "/users/:user_id/permissions/revoke",
            post(revoke_user_permission::<S>),
        )
        // Queries
        .route("/my/permissions", get(get_my_permissions::<S>))
        // Health and readiness checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<S>))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
}

// ============================================================
// Error Handling
// ============================================================

/// Error codes surfaced in API responses.
///
/// All validation failures map to a single uniform shape; the code
/// distinguishes the HTTP status via [`ApiError::into_response`].
pub mod error_codes {
    /// Referenced entity (group or grant target) does not exist. 404.
    pub const NOT_FOUND: &str = "not_found";
    /// Caller queried another principal's permissions without authorization. 403.
    pub const PERMISSION_DENIED: &str = "permission_denied";
    /// Generic input validation error. 400.
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Request body exceeds maximum allowed size. 413.
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Storage backend unavailable. 503.
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    /// Unexpected internal server error. 500.
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response format.
#[derive(Debug, Serialize)]
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

    /// Creates a not found error (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::NOT_FOUND, message)
    }

    /// Creates a permission denied error (403).
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(error_codes::PERMISSION_DENIED, message)
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a service unavailable error (503).
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::SERVICE_UNAVAILABLE, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            NOT_FOUND => StatusCode::NOT_FOUND,
            PERMISSION_DENIED => StatusCode::FORBIDDEN,
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            SERVICE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::GroupNotFound { .. } | DomainError::TargetNotFound { .. } => {
                ApiError::not_found(err.to_string())
            }
            DomainError::PermissionDenied { .. } => ApiError::permission_denied(err.to_string()),
            DomainError::InvalidInput { .. } => ApiError::validation_error(err.to_string()),
            DomainError::TraversalLimitExceeded { .. } => {
                ApiError::validation_error(err.to_string())
            }
            DomainError::Internal { .. } => {
                error!("internal error: {}", err);
                ApiError::internal_error("internal error")
            }
        }
    }
}

/// Extracts the caller identity from the request headers.
fn caller_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation_error(format!("missing {CALLER_HEADER} header")))
}

// ============================================================
// Request / Response Types
// ============================================================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub member_uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl From<PermissionRequest> for Permission {
    fn from(req: PermissionRequest) -> Self {
        Permission::new(req.action, req.resource_type, req.resource_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct MyPermissionsQuery {
    pub on_behalf_of: Option<String>,
}

// ============================================================
// Handlers
// ============================================================

async fn create_group<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    JsonBadRequest(req): JsonBadRequest<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = caller_id(&headers)?;
    let group = state
        .service
        .create_group(&caller, &req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn list_groups<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    let groups = state.service.list_groups().await?;
    Ok(Json(groups))
}

async fn get_group<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let group = state.service.get_group(&uuid).await?;
    Ok(Json(group))
}

async fn delete_group<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_group(&uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_group_member<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(container_uuid): Path<String>,
    JsonBadRequest(req): JsonBadRequest<AddMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .add_group_to_group(&req.member_uuid, &container_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn grant_group_permission<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(uuid): Path<String>,
    JsonBadRequest(req): JsonBadRequest<PermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .grant_group_permission(&uuid, req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_group_permission<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(uuid): Path<String>,
    JsonBadRequest(req): JsonBadRequest<PermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .revoke_group_permission(&uuid, &req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn grant_user_permission<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    JsonBadRequest(req): JsonBadRequest<PermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .grant_user_permission(&user_id, req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_user_permission<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    JsonBadRequest(req): JsonBadRequest<PermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .revoke_user_permission(&user_id, &req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_group_permissions<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state.service.get_group_permissions(&uuid).await?;
    Ok(Json(permissions))
}

async fn get_my_permissions<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Query(query): Query<MyPermissionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = caller_id(&headers)?;
    let permissions = state
        .service
        .get_my_permissions(&caller, query.on_behalf_of.as_deref())
        .await?;
    Ok(Json(permissions))
}

/// Basic liveness check.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness check validating the storage backend.
async fn readiness_check<S: AuthStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .service
        .health()
        .await
        .map_err(|e| ApiError::service_unavailable(e.to_string()))?;

    if !status.healthy {
        return Err(ApiError::service_unavailable(
            status.message.unwrap_or_else(|| "not ready".to_string()),
        ));
    }
    Ok(Json(serde_json::json!({ "status": "ready" })))
}
