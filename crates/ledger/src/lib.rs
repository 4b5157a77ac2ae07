// Path: crates/ledger/src/lib.rs
#![forbid(unsafe_code)]
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

//! # Medchain Ledger
//!
//! An append-only, hash-linked sequence of blocks, each carrying one
//! `MedicalRecord` and each mined until its fingerprint has the configured
//! number of leading zero hex digits.
//!
//! The [`Ledger`] is the only mutator of block history. Appends are serialized
//! by a dedicated lock and mined outside the chain lock, so readers are only
//! excluded for the instant a finished block is pushed.

pub mod chain;
pub mod journal;
pub mod mining;
pub mod verify;
pub mod worker;

pub use chain::Ledger;
pub use mining::{mine, MinedSeal};
pub use verify::{verify_blocks, ChainFault};
pub use worker::MiningWorker;
