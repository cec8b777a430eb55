use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use praetorian_core::ROOT_KEY_LENGTH;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::config::ConfigError;

/// Validated root key: an identifier plus exactly 32 secret bytes.
#[derive(Clone)]
pub struct RootKeyMaterial {
    id: String,
    secret: Zeroizing<[u8; ROOT_KEY_LENGTH]>,
}

impl RootKeyMaterial {
    pub fn new(id: impl Into<String>, secret: [u8; ROOT_KEY_LENGTH]) -> Self {
        Self {
            id: id.into(),
            secret: Zeroizing::new(secret),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret(&self) -> &[u8; ROOT_KEY_LENGTH] {
        &self.secret
    }
}

// Never print key bytes.
impl fmt::Debug for RootKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootKeyMaterial")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh root key from the OS CSPRNG.
pub fn generate_root_key(id: impl Into<String>) -> RootKeyMaterial {
    let mut bytes = Zeroizing::new([0u8; ROOT_KEY_LENGTH]);
    OsRng.fill_bytes(&mut bytes[..]);
    RootKeyMaterial::new(id, *bytes)
}

/// Standard (padded) base64, the form root keys take in configuration.
pub fn encode_root_key(material: &RootKeyMaterial) -> String {
    general_purpose::STANDARD.encode(material.secret())
}

pub fn decode_root_key(id: &str, encoded: &str) -> Result<RootKeyMaterial, ConfigError> {
    let bytes = Zeroizing::new(general_purpose::STANDARD.decode(encoded).map_err(|_| {
        ConfigError::InvalidRootKey { id: id.to_string() }
    })?);

    if bytes.len() != ROOT_KEY_LENGTH {
        return Err(ConfigError::InvalidRootKeyLength {
            id: id.to_string(),
            len: bytes.len(),
        });
    }

    let mut out = Zeroizing::new([0u8; ROOT_KEY_LENGTH]);
    out.copy_from_slice(&bytes);
    Ok(RootKeyMaterial::new(id, *out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_round_trip_through_base64() {
        let material = generate_root_key("2");
        let encoded = encode_root_key(&material);
        let decoded = decode_root_key("2", &encoded).expect("decode");

        assert_eq!(decoded.id(), "2");
        assert_eq!(decoded.secret(), material.secret());
    }

    #[test]
    fn generated_keys_differ() {
        let first = generate_root_key("a");
        let second = generate_root_key("a");
        assert_ne!(first.secret(), second.secret());
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = decode_root_key("1", "BPK//lj6hlpjuA5gPZo19OIjUDgnIQ==")
            .expect_err("should reject wrong length");
        assert_eq!(
            err,
            ConfigError::InvalidRootKeyLength {
                id: "1".into(),
                len: 22
            }
        );
    }

    #[test]
    fn decode_rejects_malformed_base64() {
        let err = decode_root_key("1", "123").expect_err("should reject bad base64");
        assert!(matches!(err, ConfigError::InvalidRootKey { .. }));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let material = RootKeyMaterial::new("1", [7u8; ROOT_KEY_LENGTH]);
        let rendered = format!("{material:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("7, 7"));
    }
}
