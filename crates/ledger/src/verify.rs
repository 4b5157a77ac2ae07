// Path: crates/ledger/src/verify.rs
//! Full-history chain verification.

use medchain_crypto::HashFunction;
use medchain_types::app::Block;
use medchain_types::error::CryptoError;
use thiserror::Error;

/// The first defect found while walking a chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    /// The chain has no genesis block.
    #[error("chain is empty")]
    Empty,
    /// A block's index does not match its position.
    #[error("block at position {position} carries index {index}")]
    OutOfSequence {
        /// Position in the slice.
        position: u64,
        /// The index the block claims.
        index: u64,
    },
    /// `previous_hash` differs from the prior block's hash.
    #[error("block {index} does not link to its predecessor")]
    BrokenLink {
        /// The offending block.
        index: u64,
    },
    /// The stored hash differs from the recomputed fingerprint.
    #[error("block {index} hash does not match its contents")]
    HashMismatch {
        /// The offending block.
        index: u64,
    },
    /// The fingerprint backend failed while recomputing a hash.
    #[error("block {index} could not be fingerprinted: {source}")]
    Fingerprint {
        /// The offending block.
        index: u64,
        /// The backend failure.
        source: CryptoError,
    },
}

/// Checks genesis, then walks every block from index 1 onward, recomputing
/// its fingerprint from the stored fields and checking its link to the
/// previous block.
///
/// This is a full O(n) rescan of the history.
pub fn verify_blocks(hasher: &dyn HashFunction, blocks: &[Block]) -> Result<(), ChainFault> {
    let Some((genesis, rest)) = blocks.split_first() else {
        return Err(ChainFault::Empty);
    };
    verify_genesis(hasher, genesis)?;

    let mut previous = genesis;
    for (position, block) in (1u64..).zip(rest) {
        if block.index != position {
            return Err(ChainFault::OutOfSequence {
                position,
                index: block.index,
            });
        }
        if block.previous_hash != previous.hash {
            return Err(ChainFault::BrokenLink { index: block.index });
        }
        check_hash(hasher, block)?;
        previous = block;
    }
    Ok(())
}

/// Checks that genesis sits at index 0 with no predecessor and a hash equal
/// to its own recomputed fingerprint.
fn verify_genesis(hasher: &dyn HashFunction, genesis: &Block) -> Result<(), ChainFault> {
    if !genesis.is_genesis() {
        return Err(ChainFault::OutOfSequence {
            position: 0,
            index: genesis.index,
        });
    }
    if !genesis.previous_hash.is_empty() {
        return Err(ChainFault::BrokenLink {
            index: genesis.index,
        });
    }
    check_hash(hasher, genesis)
}

fn check_hash(hasher: &dyn HashFunction, block: &Block) -> Result<(), ChainFault> {
    let recomputed = hasher
        .fingerprint(&block.preimage())
        .map_err(|source| ChainFault::Fingerprint {
            index: block.index,
            source,
        })?;
    if recomputed != block.hash {
        return Err(ChainFault::HashMismatch { index: block.index });
    }
    Ok(())
}
