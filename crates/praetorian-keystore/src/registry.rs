use std::{collections::HashMap, sync::Arc};

use praetorian_core::{KeyError, KeyFinder, RootKey, ACTIVE_KEY_ID};
use tracing::{info, instrument};

use crate::{
    aead::AeadKey,
    config::{ConfigError, KeyConfig},
    root_key::RootKeyMaterial,
};

/// Immutable mapping from key id to AEAD capability.
///
/// Built once at startup; the active key is additionally reachable under
/// [`ACTIVE_KEY_ID`]. Lookups never mutate, so the registry is shared across
/// request tasks without locking.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    keys: HashMap<String, Arc<AeadKey>>,
    active_id: String,
}

impl KeyRegistry {
    pub fn new(
        keys: impl IntoIterator<Item = RootKeyMaterial>,
        active_id: &str,
    ) -> Result<Self, ConfigError> {
        let mut map: HashMap<String, Arc<AeadKey>> = HashMap::new();
        for material in keys {
            if material.id() == ACTIVE_KEY_ID {
                return Err(ConfigError::ReservedKeyId {
                    id: material.id().to_string(),
                });
            }
            map.insert(material.id().to_string(), Arc::new(AeadKey::new(material)));
        }

        let active = map
            .get(active_id)
            .cloned()
            .ok_or_else(|| ConfigError::ActiveRootKeyNotFound {
                id: active_id.to_string(),
            })?;
        map.insert(ACTIVE_KEY_ID.to_string(), active);

        Ok(Self {
            keys: map,
            active_id: active_id.to_string(),
        })
    }

    /// Validate a key configuration and build the registry from it.
    #[instrument(skip_all, fields(active = %config.active_key_id))]
    pub fn from_config(config: &KeyConfig) -> Result<Self, ConfigError> {
        let validated = config.validate()?;
        let registry = Self::new(validated.keys, &validated.active_key_id)?;
        info!(keys = registry.len(), "key registry ready");
        Ok(registry)
    }

    /// Identifier of the key used for new encryptions.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Sorted root key ids, excluding the active alias.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .keys
            .keys()
            .map(String::as_str)
            .filter(|id| *id != ACTIVE_KEY_ID)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of root keys, excluding the active alias.
    pub fn len(&self) -> usize {
        self.keys.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyFinder for KeyRegistry {
    fn find(&self, id: &str) -> Result<Arc<dyn RootKey>, KeyError> {
        self.keys
            .get(id)
            .map(|key| Arc::clone(key) as Arc<dyn RootKey>)
            .ok_or_else(|| KeyError::RootKeyNotFound { id: id.to_string() })
    }
}
