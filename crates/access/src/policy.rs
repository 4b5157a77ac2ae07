// Path: crates/access/src/policy.rs
//! The access decision shared by document reads and record reads.

use crate::grants::GrantRegistry;
use medchain_types::app::Role;

/// Why a request was allowed, or that it was not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The requester is the patient who owns the data.
    Owner,
    /// The requester is the doctor assigned to the data.
    AssignedDoctor,
    /// The requester is a doctor holding an active emergency grant.
    EmergencyGrant,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Self::Denied)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::AssignedDoctor => "assigned_doctor",
            Self::EmergencyGrant => "emergency_grant",
            Self::Denied => "denied",
        }
    }
}

/// Decides whether `requester_id` acting as `role` may read data owned by
/// `patient_id` and assigned to `assigned_doctor` (empty when unassigned).
///
/// The checks, in order: owning patient, assigned doctor, doctor with an
/// active emergency grant for the patient. Grant activity is evaluated
/// against the registry clock on every call.
pub fn check_access(
    grants: &GrantRegistry,
    requester_id: &str,
    role: Role,
    patient_id: &str,
    assigned_doctor: &str,
) -> AccessDecision {
    if requester_id.is_empty() {
        return AccessDecision::Denied;
    }
    match role {
        Role::Patient if requester_id == patient_id => AccessDecision::Owner,
        Role::Patient => AccessDecision::Denied,
        Role::Doctor if requester_id == assigned_doctor => AccessDecision::AssignedDoctor,
        Role::Doctor if grants.has_active_grant(requester_id, patient_id) => {
            AccessDecision::EmergencyGrant
        }
        Role::Doctor => AccessDecision::Denied,
    }
}
