// Path: crates/types/src/app/block.rs
use crate::app::{MedicalRecord, UnixMillis};
use crate::codec;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One mined, hash-sealed entry of the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Block {
    /// Position in the chain. 0 is genesis.
    pub index: u64,
    /// Hex fingerprint of this block's fields.
    pub hash: String,
    /// Hash of the preceding block. Empty only for genesis.
    pub previous_hash: String,
    /// Creation instant.
    pub timestamp: UnixMillis,
    /// The record carried by this block. Its `ledger_hash` is always `None`.
    pub payload: MedicalRecord,
    /// Proof-of-work counter.
    pub nonce: u64,
}

impl Block {
    /// Returns true for block 0.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// The canonical bytes this block's hash is computed over.
    pub fn preimage(&self) -> Vec<u8> {
        block_preimage(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.payload,
            self.nonce,
        )
    }

    /// Returns the payload with `ledger_hash` filled in from this block.
    pub fn record(&self) -> MedicalRecord {
        let mut record = self.payload.clone();
        record.ledger_hash = Some(self.hash.clone());
        record
    }
}

/// Builds the canonical fingerprint pre-image of a block's fields.
///
/// The layout is the SCALE encoding of the tuple
/// `(index, previous_hash, timestamp, payload, nonce)`.
pub fn block_preimage(
    index: u64,
    previous_hash: &str,
    timestamp: UnixMillis,
    payload: &MedicalRecord,
    nonce: u64,
) -> Vec<u8> {
    codec::to_bytes_canonical(&(index, previous_hash, timestamp, payload, nonce))
}

/// Counts the leading `'0'` hex digits of a digest.
pub fn leading_zero_digits(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// Returns true if `hash` has at least `difficulty` leading zero hex digits.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_zero_digits(hash) >= difficulty as usize
}

/// A summary view of the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    /// Total block count including genesis.
    pub length: u64,
    /// Result of a full verification pass.
    pub is_valid: bool,
    /// The most recently appended block.
    pub last_block: Block,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RecordKind;

    fn block() -> Block {
        Block {
            index: 1,
            hash: "00ab".into(),
            previous_hash: "00ff".into(),
            timestamp: 7,
            payload: MedicalRecord::new("r", "p", RecordKind::Diagnosis, "t", "d", 7),
            nonce: 3,
        }
    }

    #[test]
    fn difficulty_counts_leading_zeros() {
        assert_eq!(leading_zero_digits("000a0"), 3);
        assert_eq!(leading_zero_digits("a000"), 0);
        assert_eq!(leading_zero_digits(""), 0);
        assert!(meets_difficulty("00ab", 2));
        assert!(!meets_difficulty("0ab0", 2));
        assert!(meets_difficulty("anything", 0));
    }

    #[test]
    fn preimage_changes_with_every_field() {
        let base = block();
        let original = base.preimage();

        let mut b = base.clone();
        b.nonce += 1;
        assert_ne!(b.preimage(), original);

        let mut b = base.clone();
        b.previous_hash.push('0');
        assert_ne!(b.preimage(), original);

        let mut b = base.clone();
        b.payload.description.push('!');
        assert_ne!(b.preimage(), original);

        // The hash itself is not part of the pre-image.
        let mut b = base;
        b.hash = "ffff".into();
        assert_eq!(b.preimage(), original);
    }

    #[test]
    fn record_backfills_ledger_hash() {
        let b = block();
        assert_eq!(b.record().ledger_hash.as_deref(), Some("00ab"));
        assert!(b.payload.ledger_hash.is_none());
    }
}
