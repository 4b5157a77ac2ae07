// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for fingerprint pre-images.
//!
//! This module provides simple wrappers around `parity-scale-codec` (SCALE), chosen
//! for its compact and deterministic encoding. Every block hash is computed over
//! bytes produced here, so all components that compute or recompute a hash must go
//! through these functions to agree on the exact same representation.

use parity_scale_codec::Encode;

/// Encodes a value into its deterministic, canonical byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Vec<u8> {
    v.encode()
}
