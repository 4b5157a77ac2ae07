// Path: crates/storage/src/lib.rs
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

//! In-memory document store for the medical record ledger.
//!
//! Each upload is encrypted under its own random key and kept under a
//! generated document id, alongside metadata carrying a content address that
//! ledger records reference. Reads are gated by the shared access decision in
//! `medchain-access`; deletes are reserved to the owning patient.

pub mod addressing;
pub mod document;
pub mod store;

pub use document::{DocumentStats, DocumentUpload, StoredDocument};
pub use store::DocumentStore;
