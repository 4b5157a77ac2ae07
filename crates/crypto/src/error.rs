// Path: crates/crypto/src/error.rs
//! Local error types for the `medchain-crypto` crate.

// Re-export the canonical error type from the types crate.
pub use medchain_types::error::CryptoError;
