// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Medchain Types
//!
//! This crate is the foundational library for the medical record ledger,
//! containing the core data structures, error types, and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `medchain-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This keeps the canonical
//! definitions of `Block`, `MedicalRecord`, `EmergencyAccessGrant` and the error
//! enums in one place and prevents circular dependencies.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::ServiceError> = std::result::Result<T, E>;

/// Core application-level data structures like `Block` and `MedicalRecord`.
pub mod app;
/// The canonical, deterministic binary codec used for fingerprint pre-images.
pub mod codec;
/// Shared configuration structures (e.g., `NodeConfig`, `LedgerConfig`).
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
