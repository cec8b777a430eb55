use std::fmt;

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use praetorian_core::{CryptoError, RootKey};

use crate::root_key::RootKeyMaterial;

/// 96-bit GCM nonce, prepended to every token.
pub const NONCE_LENGTH: usize = 12;

/// AES-256-GCM capability for one root key.
///
/// Tokens are `nonce || ciphertext || tag`, so decryption needs nothing but
/// the token bytes. No associated data is bound.
#[derive(Clone)]
pub struct AeadKey {
    material: RootKeyMaterial,
}

impl AeadKey {
    pub fn new(material: RootKeyMaterial) -> Self {
        Self { material }
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(self.material.secret())
            .map_err(|e| CryptoError::Cipher(e.to_string()))
    }
}

impl RootKey for AeadKey {
    fn id(&self) -> &str {
        self.material.id()
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.cipher()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::Seal)?;

        let mut token = Vec::with_capacity(NONCE_LENGTH + sealed.len());
        token.extend_from_slice(nonce.as_slice());
        token.extend_from_slice(&sealed);
        Ok(token)
    }

    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.cipher()?;
        if token.len() < NONCE_LENGTH {
            return Err(CryptoError::Authentication);
        }

        let (nonce, sealed) = token.split_at(NONCE_LENGTH);
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Authentication)
    }
}

impl fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadKey")
            .field("id", &self.material.id())
            .finish_non_exhaustive()
    }
}
