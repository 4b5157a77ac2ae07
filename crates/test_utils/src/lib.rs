// Path: crates/test_utils/src/lib.rs
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

//! # Medchain Test Utilities
//!
//! Assertion macros, a seeded RNG and record/document fixtures shared by the
//! test suites of the ledger, storage, access and node crates.

pub mod assertions;
pub mod fixtures;
pub mod randomness;

#[doc(hidden)]
pub use medchain_types::error::ErrorCode;
