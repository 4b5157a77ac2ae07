// Path: crates/types/src/app/access.rs
use crate::app::UnixMillis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a requester acts under.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A patient, owner of their own documents and records.
    Patient,
    /// A doctor, reading through assignment or emergency grants.
    Doctor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => f.write_str("patient"),
            Self::Doctor => f.write_str("doctor"),
        }
    }
}

/// The breadth of an emergency grant, recorded for audit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Essential information only.
    Basic,
    /// The complete record set.
    Full,
}

/// The derived lifecycle state of a grant at a given instant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    /// `now < expires_at` and the grant was not ended early.
    Active,
    /// `now >= expires_at`.
    Expired,
    /// Ended early by the doctor who holds it.
    Revoked,
}

/// A time-bounded override letting a doctor read a patient's data.
///
/// Activity is a pure function of the clock: `status_at` recomputes it from
/// `expires_at` and `revoked_at` on every call. `is_active` is only a snapshot
/// taken when the value was handed out and is never consulted for decisions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmergencyAccessGrant {
    /// Unique grant identifier.
    pub id: String,
    /// The patient whose data is opened.
    pub patient_id: String,
    /// The doctor receiving access.
    pub doctor_id: String,
    /// Requested breadth.
    pub access_level: AccessLevel,
    /// The justification given by the doctor.
    pub reason: String,
    /// Creation instant.
    pub created_at: UnixMillis,
    /// The instant from which the grant no longer applies.
    pub expires_at: UnixMillis,
    /// Set when the doctor ends the emergency session early.
    #[serde(default)]
    pub revoked_at: Option<UnixMillis>,
    /// Snapshot of `is_active_at(now)` when this value was produced.
    pub is_active: bool,
}

impl EmergencyAccessGrant {
    /// Computes the grant state at `now`.
    pub fn status_at(&self, now: UnixMillis) -> GrantStatus {
        match self.revoked_at {
            Some(revoked) if now >= revoked => GrantStatus::Revoked,
            _ if now >= self.expires_at => GrantStatus::Expired,
            _ => GrantStatus::Active,
        }
    }

    /// Returns true while the grant applies.
    pub fn is_active_at(&self, now: UnixMillis) -> bool {
        self.status_at(now) == GrantStatus::Active
    }

    /// Returns a copy with the `is_active` snapshot refreshed for `now`.
    pub fn snapshot(&self, now: UnixMillis) -> Self {
        let mut copy = self.clone();
        copy.is_active = self.is_active_at(now);
        copy
    }
}
