// Path: crates/ledger/src/mining.rs
//! The proof-of-work nonce search.

use medchain_crypto::HashFunction;
use medchain_types::app::{meets_difficulty, MedicalRecord, UnixMillis};
use medchain_types::codec;
use medchain_types::error::LedgerError;

/// The result of a successful search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedSeal {
    /// The winning fingerprint.
    pub hash: String,
    /// The nonce that produced it.
    pub nonce: u64,
    /// Number of fingerprints computed, the winning one included.
    pub attempts: u64,
}

/// Starting from nonce 0, increments the nonce and recomputes the block
/// fingerprint until it has at least `difficulty` leading zero hex digits.
/// The first nonce tried is therefore 1.
///
/// With `limit = None` the search is unbounded. With `Some(n)` at most `n`
/// fingerprints are computed before `LedgerError::MiningExhausted` is returned.
///
/// The pre-image is the SCALE encoding of
/// `(index, previous_hash, timestamp, payload, nonce)`. SCALE encodes a tuple
/// as the concatenation of its fields, so the prefix is encoded once and only
/// the trailing nonce is rewritten per attempt.
pub fn mine(
    hasher: &dyn HashFunction,
    index: u64,
    previous_hash: &str,
    timestamp: UnixMillis,
    payload: &MedicalRecord,
    difficulty: u32,
    limit: Option<u64>,
) -> Result<MinedSeal, LedgerError> {
    let mut preimage = codec::to_bytes_canonical(&(index, previous_hash, timestamp, payload));
    let prefix_len = preimage.len();

    let mut nonce: u64 = 0;
    let mut attempts: u64 = 0;
    loop {
        if limit.is_some_and(|max| attempts >= max) {
            return Err(LedgerError::MiningExhausted {
                attempts,
                difficulty,
            });
        }

        nonce = nonce.wrapping_add(1);
        preimage.truncate(prefix_len);
        preimage.extend_from_slice(&codec::to_bytes_canonical(&nonce));
        let hash = hasher
            .fingerprint(&preimage)
            .map_err(|source| LedgerError::Fingerprint { index, source })?;
        attempts += 1;

        if meets_difficulty(&hash, difficulty) {
            return Ok(MinedSeal {
                hash,
                nonce,
                attempts,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medchain_crypto::{Rolling32Hash, Sha256Hash};
    use medchain_test_utils::assert_in_range;
    use medchain_types::app::{block_preimage, leading_zero_digits, RecordKind};

    fn payload() -> MedicalRecord {
        MedicalRecord::new("rx-1", "patient-1", RecordKind::Prescription, "Amoxicillin", "500mg", 1_000)
    }

    #[test]
    fn test_seal_matches_full_preimage() {
        let hasher = Sha256Hash;
        let seal = mine(&hasher, 3, "00ab", 1_000, &payload(), 2, None).unwrap();
        let expected = hasher
            .fingerprint(&block_preimage(3, "00ab", 1_000, &payload(), seal.nonce))
            .unwrap();
        assert_eq!(seal.hash, expected);
        assert!(leading_zero_digits(&seal.hash) >= 2);
        assert_eq!(seal.attempts, seal.nonce);
    }

    #[test]
    fn test_difficulty_zero_accepts_first_nonce() {
        let seal = mine(&Rolling32Hash, 1, "", 0, &payload(), 0, None).unwrap();
        assert_eq!(seal.nonce, 1);
        assert_eq!(seal.attempts, 1);
    }

    #[test]
    fn test_bounded_search_gives_up() {
        // Eight zero digits on a 32-bit digest means a zero hash; a handful
        // of attempts will not find it.
        let err = mine(&Rolling32Hash, 1, "abc", 5, &payload(), 8, Some(16)).unwrap_err();
        match err {
            LedgerError::MiningExhausted {
                attempts,
                difficulty,
            } => {
                assert_eq!(attempts, 16);
                assert_eq!(difficulty, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bounded_search_stays_within_limit() {
        let seal = mine(&Sha256Hash, 2, "00ab", 9, &payload(), 1, Some(4_096)).unwrap();
        assert_in_range!(seal.attempts, 1, 4_096);
        assert_eq!(seal.attempts, seal.nonce);
    }

    #[test]
    fn test_zero_limit_never_hashes() {
        let err = mine(&Sha256Hash, 1, "", 0, &payload(), 0, Some(0)).unwrap_err();
        assert!(matches!(err, LedgerError::MiningExhausted { attempts: 0, .. }));
    }
}
