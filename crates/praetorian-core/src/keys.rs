use std::sync::Arc;

use thiserror::Error;

/// Reserved alias that resolves to whichever root key encrypts new payloads.
pub const ACTIVE_KEY_ID: &str = "active";

/// Root keys are AES-256 keys.
pub const ROOT_KEY_LENGTH: usize = 32;

/// Errors produced when resolving a root key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// No key is registered under the requested identifier.
    #[error("root key not found")]
    RootKeyNotFound { id: String },
}

/// Errors produced by a root key's cryptographic operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The cipher could not be built from the key material.
    #[error("unable to create AES-256-GCM cipher: {0}")]
    Cipher(String),
    /// Sealing the plaintext failed.
    #[error("encryption failed")]
    Seal,
    /// The token was tampered with, truncated, or sealed under another key.
    #[error("data authentication failed")]
    Authentication,
}

impl CryptoError {
    /// True when the failure is attributable to the token rather than the server.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CryptoError::Authentication)
    }
}

/// Authenticated-encryption capability bound to a single root key.
pub trait RootKey: Send + Sync {
    /// Identifier echoed back to callers so tokens are self-locating.
    fn id(&self) -> &str;

    /// Seal `plaintext` under a fresh nonce. The output embeds the nonce.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verify and open a token produced by [`RootKey::encrypt`].
    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Retrieves root keys from an underlying keystore.
pub trait KeyFinder: Send + Sync {
    fn find(&self, id: &str) -> Result<Arc<dyn RootKey>, KeyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_hides_requested_id() {
        let err = KeyError::RootKeyNotFound {
            id: "missing".into(),
        };
        assert_eq!(err.to_string(), "root key not found");
    }

    #[test]
    fn only_authentication_failures_are_flagged() {
        assert!(CryptoError::Authentication.is_authentication());
        assert!(!CryptoError::Seal.is_authentication());
        assert!(!CryptoError::Cipher("bad length".into()).is_authentication());
        assert_eq!(
            CryptoError::Authentication.to_string(),
            "data authentication failed"
        );
    }
}
