// Path: crates/access/src/lib.rs
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

//! # Medchain Access Control
//!
//! Tracks time-bounded emergency grants and decides whether a requester may
//! read a patient's data. Every decision is computed fresh from the grant
//! registry and the injected clock; nothing is cached.

pub mod grants;
pub mod policy;

pub use grants::{GrantRegistry, GrantRequest};
pub use policy::{check_access, AccessDecision};
