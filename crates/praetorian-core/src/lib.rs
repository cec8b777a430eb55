//! Core abstractions for Praetorian: root key capabilities and the lookup contract.
//! This crate carries no crypto dependencies; implementations live in `praetorian-keystore`.

pub mod keys;

pub use keys::{CryptoError, KeyError, KeyFinder, RootKey, ACTIVE_KEY_ID, ROOT_KEY_LENGTH};
