// Path: crates/crypto/src/lib.rs
//! # Medchain Crypto Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Medchain Cryptography
//!
//! The pluggable primitives behind the ledger and the document store: fingerprint
//! functions for mining and content addressing, and the per-document cipher.

pub mod algorithms;
pub mod cipher;
pub mod error;

pub use algorithms::hash::{fingerprint_for, HashFunction, Rolling32Hash, Sha256Hash};
pub use cipher::{ChaChaDocumentCipher, DocumentCipher, DocumentKey};
