//! Concrete key handling for Praetorian.
//! Root keys are validated once at startup and sealed with AES-256-GCM.

pub mod aead;
pub mod config;
pub mod registry;
pub mod root_key;

pub use aead::AeadKey;
pub use config::{ConfigError, KeyConfig, ValidatedKeys};
pub use registry::KeyRegistry;
pub use root_key::RootKeyMaterial;
