use axum::{body::Body, extract::State, http::StatusCode, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::IgnoredAny;
use tracing::{debug, instrument};

use crate::api::{json_response, read_body, ApiError, AppState, WrapToken};

/// POST /wrap - seal an arbitrary JSON document under the active root key.
///
/// The document is only checked for well-formedness; the exact bytes received
/// are what gets encrypted.
#[instrument(skip_all)]
pub(crate) async fn handle_wrap(
    State(state): State<AppState>,
    body: Body,
) -> Result<Response, ApiError> {
    let payload = read_body(body).await?;
    serde_json::from_slice::<IgnoredAny>(&payload).map_err(|_| ApiError::InvalidJson)?;

    let key = state.keys.find(&state.active_key_id)?;
    let sealed = key.encrypt(&payload)?;

    debug!(key_id = key.id(), bytes = payload.len(), "wrapped payload");
    Ok(json_response(
        StatusCode::CREATED,
        &WrapToken {
            id: key.id().to_string(),
            token: STANDARD.encode(sealed),
        },
    ))
}
