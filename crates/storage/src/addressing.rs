// Path: crates/storage/src/addressing.rs
//! Content address derivation.

use medchain_crypto::{HashFunction, Sha256Hash};
use medchain_types::app::UnixMillis;
use medchain_types::codec;
use medchain_types::config::AddressingMode;
use medchain_types::error::CryptoError;

/// Prefix of addresses derived from the plaintext bytes.
pub const CONTENT_HASH_PREFIX: &str = "sha256-";
/// Prefix of addresses derived from file attributes.
pub const ATTRIBUTES_PREFIX: &str = "Qm";

/// Derives the content address of an upload.
///
/// `ContentHash` hashes the plaintext, so identical bytes always share an
/// address. `Attributes` fingerprints `(file_name, file_size, upload_date)`
/// with `hasher`: identical content uploaded twice gets two addresses, and
/// the bytes themselves play no part.
pub fn content_address(
    mode: AddressingMode,
    hasher: &dyn HashFunction,
    bytes: &[u8],
    file_name: &str,
    file_size: u64,
    upload_date: UnixMillis,
) -> Result<String, CryptoError> {
    match mode {
        AddressingMode::ContentHash => {
            Ok(format!("{CONTENT_HASH_PREFIX}{}", Sha256Hash.fingerprint(bytes)?))
        }
        AddressingMode::Attributes => {
            let preimage = codec::to_bytes_canonical(&(file_name, file_size, upload_date));
            Ok(format!("{ATTRIBUTES_PREFIX}{}", hasher.fingerprint(&preimage)?))
        }
    }
}
