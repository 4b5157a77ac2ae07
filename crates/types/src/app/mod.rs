// Path: crates/types/src/app/mod.rs
//! Core application-level data structures like Blocks and Medical Records.

/// Roles, access levels and emergency access grants.
pub mod access;
/// The ledger block and chain summary types.
pub mod block;
/// Wall-clock abstraction used for timestamps and grant expiry.
pub mod clock;
/// The medical record payload carried by every block.
pub mod record;

pub use access::*;
pub use block::*;
pub use clock::*;
pub use record::*;
