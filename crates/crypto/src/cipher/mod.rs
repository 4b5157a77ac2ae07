// Path: crates/crypto/src/cipher/mod.rs
//! Per-document symmetric encryption.
//!
//! Blob layout:
//! [ Nonce: 12B ]
//! [ Ciphertext + Tag: N + 16 ]

use crate::error::CryptoError;
use dcrypt::algorithms::aead::chacha20poly1305::ChaCha20Poly1305;
use dcrypt::algorithms::types::Nonce;
use dcrypt::api::traits::symmetric::{DecryptOperation, EncryptOperation, SymmetricCipher};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a document key in bytes.
pub const KEY_LEN: usize = 32;
/// Length of the per-blob nonce in bytes.
pub const NONCE_LEN: usize = 12;
/// Length of the authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// A random per-document key. Zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DocumentKey([u8; KEY_LEN]);

impl DocumentKey {
    /// Draws a fresh key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wraps existing key material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses the hex form handed to the owning patient.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(s).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let bytes: [u8; KEY_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            CryptoError::InvalidKey(format!("expected {} bytes, got {}", KEY_LEN, raw.len()))
        })?;
        Ok(Self(bytes))
    }

    /// The hex form of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Borrows the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DocumentKey(<redacted>)")
    }
}

/// A reversible transform of document payloads keyed by a `DocumentKey`.
pub trait DocumentCipher: Send + Sync + fmt::Debug {
    /// Encrypts `plaintext`, returning a self-contained blob.
    fn encrypt(&self, key: &DocumentKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts a blob produced by `encrypt` under the same key.
    ///
    /// A wrong key or a modified blob yields `CryptoError::DecryptionFailed`.
    fn decrypt(&self, key: &DocumentKey, blob: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Get the name of the cipher
    fn name(&self) -> &str;
}

/// ChaCha20-Poly1305 with a random nonce per blob.
#[derive(Debug, Default, Clone)]
pub struct ChaChaDocumentCipher;

impl DocumentCipher for ChaChaDocumentCipher {
    fn encrypt(&self, key: &DocumentKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let cipher = ChaCha20Poly1305::new(key.as_bytes());
        let nonce = Nonce::new(nonce_bytes);

        let ciphertext = SymmetricCipher::encrypt(&cipher)
            .with_nonce(&nonce)
            .encrypt(plaintext)
            .map_err(|e| CryptoError::OperationFailed(format!("Encryption failed: {}", e)))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(ciphertext.as_ref());
        Ok(blob)
    }

    fn decrypt(&self, key: &DocumentKey, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::InvalidInput(format!(
                "blob of {} bytes is shorter than nonce and tag",
                blob.len()
            )));
        }
        let (nonce_part, body) = blob.split_at(NONCE_LEN);
        let nonce_bytes: [u8; NONCE_LEN] = nonce_part
            .try_into()
            .map_err(|_| CryptoError::InvalidInput("malformed nonce".into()))?;

        let cipher = ChaCha20Poly1305::new(key.as_bytes());
        let nonce = Nonce::new(nonce_bytes);
        let ciphertext = dcrypt::api::types::Ciphertext::new(body);

        SymmetricCipher::decrypt(&cipher)
            .with_nonce(&nonce)
            .decrypt(&ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    fn name(&self) -> &str {
        "CHACHA20-POLY1305"
    }
}
