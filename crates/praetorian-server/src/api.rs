//! Router, shared state and the uniform `{message}` error envelope.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use praetorian_core::{CryptoError, KeyError, KeyFinder, ACTIVE_KEY_ID};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::{logging::log_request, unwrap::handle_unwrap, wrap::handle_wrap};

/// Request bodies are capped at 1 MiB.
pub const MAX_BODY_BYTES: usize = 1 << 20;

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// State shared by every request. Holds only read-only data.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<dyn KeyFinder>,
    /// Id the wrap handler resolves; normally the `active` alias.
    pub active_key_id: String,
}

impl AppState {
    pub fn new(keys: Arc<dyn KeyFinder>) -> Self {
        Self {
            keys,
            active_key_id: ACTIVE_KEY_ID.to_string(),
        }
    }

    pub fn with_active_key_id(mut self, id: impl Into<String>) -> Self {
        self.active_key_id = id.into();
        self
    }
}

/// Wrap response and unwrap request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WrapToken {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

/// Every way a request can fail once it reaches a handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,
    #[error("failed to read request body")]
    UnreadableBody,
    #[error("invalid JSON")]
    InvalidJson,
    #[error(transparent)]
    InvalidToken(#[from] base64::DecodeError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::Key(_) => StatusCode::NOT_FOUND,
            ApiError::UnreadableBody | ApiError::InvalidJson | ApiError::InvalidToken(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Crypto(err) if err.is_authentication() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        json_response(
            status,
            &ErrorResponse {
                message: self.to_string(),
            },
        )
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/wrap", post(handle_wrap).fallback(not_found))
        .route("/unwrap", post(handle_unwrap).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Read the whole body under [`MAX_BODY_BYTES`]. Oversized bodies, client
/// disconnects and read timeouts all surface as [`ApiError::UnreadableBody`].
pub(crate) async fn read_body(body: Body) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            debug!(error = %err, "body read failed");
            ApiError::UnreadableBody
        })
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => raw_json_response(status, bytes),
        Err(err) => {
            error!(error = %err, "response serialization failed");
            raw_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"message":"internal error"}"#.to_vec(),
            )
        }
    }
}

/// Emit `body` as-is with the JSON content type.
pub(crate) fn raw_json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}
