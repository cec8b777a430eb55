use axum::{body::Body, extract::State, http::StatusCode, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::api::{raw_json_response, read_body, ApiError, AppState, WrapToken};

/// POST /unwrap - open a token and return the original document verbatim.
#[instrument(skip_all)]
pub(crate) async fn handle_unwrap(
    State(state): State<AppState>,
    body: Body,
) -> Result<Response, ApiError> {
    let body = read_body(body).await?;
    let request = parse_request(&body)?;

    let key = state.keys.find(&request.id)?;
    let sealed = STANDARD.decode(&request.token)?;
    let payload = key.decrypt(&sealed)?;

    debug!(key_id = key.id(), bytes = payload.len(), "unwrapped payload");
    Ok(raw_json_response(StatusCode::OK, payload))
}

/// Only a JSON object is a request; arrays must not bind positionally.
fn parse_request(body: &[u8]) -> Result<WrapToken, ApiError> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    serde_json::from_value(Value::Object(object)).map_err(|_| ApiError::InvalidJson)
}
