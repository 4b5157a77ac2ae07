// Path: crates/access/src/grants.rs
//! The emergency grant registry.

use ahash::AHashMap;
use medchain_telemetry::access_metrics;
use medchain_types::app::{AccessLevel, Clock, EmergencyAccessGrant, UnixMillis, MILLIS_PER_MINUTE};
use medchain_types::config::EmergencyConfig;
use medchain_types::error::{GrantError, ValidationError};
use parking_lot::RwLock;
use std::sync::Arc;

/// A doctor's request to open a patient's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub access_level: AccessLevel,
    /// Mandatory justification.
    pub reason: String,
    /// Requested lifetime. `None` uses the configured default.
    pub duration_mins: Option<u64>,
}

impl GrantRequest {
    pub fn new(
        patient_id: impl Into<String>,
        doctor_id: impl Into<String>,
        access_level: AccessLevel,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            access_level,
            reason: reason.into(),
            duration_mins: None,
        }
    }

    pub fn for_minutes(mut self, minutes: u64) -> Self {
        self.duration_mins = Some(minutes);
        self
    }
}

/// In-memory store of every grant ever issued.
///
/// Grants are never deleted, so a revoked or expired grant still answers
/// `get` and `grants_for_patient` for audit. Multiple grants for the same
/// (patient, doctor) pair coexist; a doctor's effective access is the union
/// of the ones currently active.
#[derive(Debug)]
pub struct GrantRegistry {
    config: EmergencyConfig,
    clock: Arc<dyn Clock>,
    grants: RwLock<AHashMap<String, EmergencyAccessGrant>>,
}

impl GrantRegistry {
    pub fn new(config: EmergencyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            grants: RwLock::new(AHashMap::new()),
        }
    }

    pub fn now(&self) -> UnixMillis {
        self.clock.now_ms()
    }

    /// Validates `request` and records a new grant starting now.
    pub fn grant(&self, request: GrantRequest) -> Result<EmergencyAccessGrant, ValidationError> {
        if request.patient_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("patient_id"));
        }
        if request.doctor_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("doctor_id"));
        }
        if request.reason.trim().is_empty() {
            return Err(ValidationError::EmptyField("reason"));
        }
        let minutes = request
            .duration_mins
            .unwrap_or(self.config.default_duration_mins);
        if minutes == 0 || minutes > self.config.max_duration_mins {
            return Err(ValidationError::InvalidDuration {
                minutes,
                max: self.config.max_duration_mins,
            });
        }

        let created_at = self.now();
        let grant = EmergencyAccessGrant {
            id: format!("emergency-{}", uuid::Uuid::new_v4()),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            access_level: request.access_level,
            reason: request.reason,
            created_at,
            expires_at: created_at.saturating_add(minutes.saturating_mul(MILLIS_PER_MINUTE)),
            revoked_at: None,
            is_active: true,
        };

        self.grants.write().insert(grant.id.clone(), grant.clone());
        access_metrics().inc_emergency_grants();
        tracing::warn!(
            target: "access",
            grant_id = %grant.id,
            patient_id = %grant.patient_id,
            doctor_id = %grant.doctor_id,
            level = ?grant.access_level,
            expires_at = grant.expires_at,
            "Emergency access granted"
        );
        Ok(grant)
    }

    /// Ends an active grant early. Only the doctor holding it may do so.
    pub fn revoke(&self, grant_id: &str, doctor_id: &str) -> Result<EmergencyAccessGrant, GrantError> {
        let now = self.now();
        let mut grants = self.grants.write();
        let grant = grants
            .get_mut(grant_id)
            .ok_or_else(|| GrantError::NotFound(grant_id.to_string()))?;
        if grant.doctor_id != doctor_id {
            return Err(GrantError::NotHolder {
                grant_id: grant_id.to_string(),
                doctor_id: doctor_id.to_string(),
            });
        }
        if !grant.is_active_at(now) {
            return Err(GrantError::Inactive(grant_id.to_string()));
        }
        grant.revoked_at = Some(now);
        let snapshot = grant.snapshot(now);
        drop(grants);

        access_metrics().inc_emergency_revocations();
        tracing::info!(
            target: "access",
            grant_id,
            doctor_id,
            patient_id = %snapshot.patient_id,
            "Emergency access ended"
        );
        Ok(snapshot)
    }

    /// The grant with `is_active` recomputed for now.
    pub fn get(&self, grant_id: &str) -> Option<EmergencyAccessGrant> {
        let now = self.now();
        self.grants.read().get(grant_id).map(|g| g.snapshot(now))
    }

    /// Grants currently active for `doctor_id`, soonest expiry first.
    pub fn active_grants_for_doctor(&self, doctor_id: &str) -> Vec<EmergencyAccessGrant> {
        let now = self.now();
        let mut out: Vec<_> = self
            .grants
            .read()
            .values()
            .filter(|g| g.doctor_id == doctor_id && g.is_active_at(now))
            .map(|g| g.snapshot(now))
            .collect();
        out.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Every grant ever issued for `patient_id`, newest first.
    pub fn grants_for_patient(&self, patient_id: &str) -> Vec<EmergencyAccessGrant> {
        let now = self.now();
        let mut out: Vec<_> = self
            .grants
            .read()
            .values()
            .filter(|g| g.patient_id == patient_id)
            .map(|g| g.snapshot(now))
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// True if any grant naming this pair is active now.
    pub fn has_active_grant(&self, doctor_id: &str, patient_id: &str) -> bool {
        let now = self.now();
        self.grants
            .read()
            .values()
            .any(|g| g.doctor_id == doctor_id && g.patient_id == patient_id && g.is_active_at(now))
    }

    /// Patients `doctor_id` can currently read through a grant.
    pub fn patients_with_active_grant(&self, doctor_id: &str) -> Vec<String> {
        let mut patients: Vec<String> = self
            .active_grants_for_doctor(doctor_id)
            .into_iter()
            .map(|g| g.patient_id)
            .collect();
        patients.sort();
        patients.dedup();
        patients
    }
}
