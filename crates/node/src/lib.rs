// Path: crates/node/src/lib.rs
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

//! # Medchain Node
//!
//! Wires the ledger, the document store and the emergency grant registry into
//! a single [`MedicalRecordService`], the surface external collaborators call.

pub mod probe;
pub mod service;

pub use probe::LedgerProbe;
pub use service::{
    EmergencyAccessReceipt, MedicalRecordService, UploadReceipt, EMERGENCY_RECORD_TITLE,
};
