//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use praetorian_core::{CryptoError, KeyError, KeyFinder, RootKey, ACTIVE_KEY_ID};
use praetorian_keystore::{KeyConfig, KeyRegistry};
use tower::ServiceExt;

use crate::api::{AppState, ErrorResponse, WrapToken};

pub const TEST_CONFIG: &str = r#"{"activeKeyId": "1", "rootKeys": {"1": "kSRFQxepULO9UC5SL5pA/mXjbI1GXu9ha2T0yPr3scU=", "2": "3q2+7wAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="}}"#;

/// Payload the mock key refuses to seal.
pub const SEAL_FAILURE_PAYLOAD: &str = r#"{"message": "error"}"#;

/// Keystore double with a single key, `1`, also reachable as `active`.
pub struct MockKeystore;

impl KeyFinder for MockKeystore {
    fn find(&self, id: &str) -> Result<Arc<dyn RootKey>, KeyError> {
        match id {
            "1" | ACTIVE_KEY_ID => Ok(Arc::new(MockKey)),
            _ => Err(KeyError::RootKeyNotFound { id: id.to_string() }),
        }
    }
}

/// Deterministic key: seals to a fixed token and opens `error` as an internal
/// failure and `open\n` as tampered data.
pub struct MockKey;

impl RootKey for MockKey {
    fn id(&self) -> &str {
        "1"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if plaintext == SEAL_FAILURE_PAYLOAD.as_bytes() {
            return Err(CryptoError::Seal);
        }
        Ok(b"encrypted message".to_vec())
    }

    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match token {
            b"error" => Err(CryptoError::Cipher("invalid key length".into())),
            b"open\n" => Err(CryptoError::Authentication),
            _ => Ok(br#"{"value":"decrypted message"}"#.to_vec()),
        }
    }
}

pub fn mock_state() -> AppState {
    AppState::new(Arc::new(MockKeystore))
}

pub fn registry_state() -> AppState {
    let config = KeyConfig::from_json(TEST_CONFIG).expect("test config");
    let registry = KeyRegistry::from_config(&config).expect("test registry");
    AppState::new(Arc::new(registry))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    pub fn error_message(&self) -> String {
        let res: ErrorResponse = serde_json::from_slice(&self.body).expect("error envelope");
        res.message
    }

    pub fn wrap_token(&self) -> WrapToken {
        serde_json::from_slice(&self.body).expect("wrap token")
    }
}

pub async fn call(app: Router, method: Method, uri: &str, body: impl Into<Body>) -> TestResponse {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .expect("request"),
        )
        .await
        .expect("infallible");

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");

    TestResponse {
        status,
        content_type,
        body,
    }
}
