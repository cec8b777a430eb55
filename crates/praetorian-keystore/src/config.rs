use std::{collections::BTreeMap, fmt};

use praetorian_core::ACTIVE_KEY_ID;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::root_key::{decode_root_key, RootKeyMaterial};

/// Errors raised while turning configuration into usable root keys.
/// All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("env config not set or empty")]
    Empty,
    #[error("unable to parse config data")]
    Invalid(String),
    #[error("unable to decode root key")]
    InvalidRootKey { id: String },
    #[error("root key length must be 32 bytes")]
    InvalidRootKeyLength { id: String, len: usize },
    #[error("active key does not exist in root keys")]
    ActiveRootKeyNotFound { id: String },
    #[error("root key id `{id}` is reserved")]
    ReservedKeyId { id: String },
}

/// Key configuration as provisioned out-of-band.
///
/// JSON form: `{"activeKeyId": "1", "rootKeys": {"1": "<base64>"}}`. The
/// snake_case spellings are accepted too so the same struct reads TOML files.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyConfig {
    #[serde(alias = "active_key_id")]
    pub active_key_id: String,
    #[serde(alias = "root_keys")]
    pub root_keys: BTreeMap<String, String>,
}

/// Root keys that passed validation, ready to build a registry from.
#[derive(Debug, Clone)]
pub struct ValidatedKeys {
    pub active_key_id: String,
    pub keys: Vec<RootKeyMaterial>,
}

impl KeyConfig {
    /// Parse the JSON document carried in the environment.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Err(ConfigError::Empty);
        }
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check the active id first, then decode every key in id order.
    pub fn validate(&self) -> Result<ValidatedKeys, ConfigError> {
        if !self.root_keys.contains_key(&self.active_key_id) {
            return Err(ConfigError::ActiveRootKeyNotFound {
                id: self.active_key_id.clone(),
            });
        }

        let mut keys = Vec::with_capacity(self.root_keys.len());
        for (id, encoded) in &self.root_keys {
            if id == ACTIVE_KEY_ID {
                return Err(ConfigError::ReservedKeyId { id: id.clone() });
            }
            keys.push(decode_root_key(id, encoded)?);
        }

        debug!(count = keys.len(), active = %self.active_key_id, "validated root keys");
        Ok(ValidatedKeys {
            active_key_id: self.active_key_id.clone(),
            keys,
        })
    }
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("active_key_id", &self.active_key_id)
            .field("root_keys", &self.root_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
