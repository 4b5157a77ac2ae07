// Path: crates/crypto/src/algorithms/hash/mod.rs
//! Fingerprint functions used for mining, verification and content addressing.
//!
//! Every implementation is pure and deterministic and yields a fixed-width
//! digest. The ledger only sees the `HashFunction` trait, so the backend can be
//! swapped without touching any other component.

use crate::error::CryptoError;
use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::ByteSerializable;
use medchain_types::config::FingerprintKind;
use std::sync::Arc;

/// Hash function trait
pub trait HashFunction: Send + Sync + std::fmt::Debug {
    /// Hash a message and return the digest
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Get the digest size in bytes
    fn digest_size(&self) -> usize;

    /// Get the name of the hash function
    fn name(&self) -> &str;

    /// Hash a message and return the lowercase hex digest.
    ///
    /// The result is always `2 * digest_size()` characters wide.
    fn fingerprint(&self, message: &[u8]) -> Result<String, CryptoError> {
        let digest = self.hash(message)?;
        if digest.len() != self.digest_size() {
            return Err(CryptoError::InvalidHashLength {
                expected: self.digest_size(),
                got: digest.len(),
            });
        }
        Ok(hex::encode(digest))
    }
}

/// SHA-256 hash function implementation using dcrypt
#[derive(Debug, Default, Clone)]
pub struct Sha256Hash;

impl HashFunction for Sha256Hash {
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        // CryptoError only converts from the top-level `dcrypt::Error`.
        let digest = DcryptSha256::digest(message).map_err(dcrypt::Error::from)?;
        Ok(digest.to_bytes())
    }

    fn digest_size(&self) -> usize {
        32 // 256 bits = 32 bytes
    }

    fn name(&self) -> &str {
        "SHA-256"
    }
}

/// The legacy 32-bit rolling hash (`h = h * 31 + byte`, wrapping).
///
/// It is fast and deterministic but offers no resistance to deliberate
/// collisions. It exists so chains mined by the original scheme can still be
/// verified, and to keep high-difficulty tests cheap.
#[derive(Debug, Default, Clone)]
pub struct Rolling32Hash;

impl HashFunction for Rolling32Hash {
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut h: i32 = 0;
        for byte in message {
            h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(*byte));
        }
        // The magnitude of i32::MIN does not fit in i32, so widen first.
        let magnitude = (i64::from(h)).unsigned_abs() as u32;
        Ok(magnitude.to_be_bytes().to_vec())
    }

    fn digest_size(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "ROLLING-32"
    }
}

/// Returns the configured fingerprint backend.
pub fn fingerprint_for(kind: FingerprintKind) -> Arc<dyn HashFunction> {
    match kind {
        FingerprintKind::Sha256 => Arc::new(Sha256Hash),
        FingerprintKind::Rolling32 => Arc::new(Rolling32Hash),
    }
}

#[cfg(test)]
mod tests;
