// Path: crates/types/src/app/record.rs
use crate::app::UnixMillis;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a medical record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A medication prescription.
    Prescription,
    /// A laboratory or imaging report.
    TestReport,
    /// A clinical diagnosis.
    Diagnosis,
    /// An audit entry written when a doctor invokes emergency access.
    EmergencyAccess,
}

impl RecordKind {
    /// Returns the stable snake_case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prescription => "prescription",
            Self::TestReport => "test_report",
            Self::Diagnosis => "diagnosis",
            Self::EmergencyAccess => "emergency_access",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metadata of a single medical record, carried as the payload of one block.
///
/// A record is constructed by a caller, embedded in a block at append time and
/// immutable from then on. `ledger_hash` is never part of the stored payload: the
/// ledger fills it in from the owning block whenever records are read back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MedicalRecord {
    /// Caller-assigned record identifier.
    pub id: String,
    /// The patient the record belongs to.
    pub patient_id: String,
    /// The responsible doctor. Empty until a doctor is assigned.
    #[serde(default)]
    pub doctor_id: String,
    /// The record category.
    pub kind: RecordKind,
    /// Short human-readable title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Original file name of an attached document, if any.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Content address of the attached document in the document store.
    #[serde(default)]
    pub file_reference: Option<String>,
    /// Hash of the block carrying this record. Only populated on read.
    #[serde(default)]
    pub ledger_hash: Option<String>,
    /// Creation instant.
    pub timestamp: UnixMillis,
    /// Set on records that audit an emergency access grant.
    #[serde(default)]
    pub is_emergency_access: bool,
    /// Expiry of the audited emergency grant.
    #[serde(default)]
    pub emergency_expiry: Option<UnixMillis>,
}

impl MedicalRecord {
    /// Creates a record with no doctor, no attachment and no emergency data.
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        kind: RecordKind,
        title: impl Into<String>,
        description: impl Into<String>,
        timestamp: UnixMillis,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            doctor_id: String::new(),
            kind,
            title: title.into(),
            description: description.into(),
            file_name: None,
            file_reference: None,
            ledger_hash: None,
            timestamp,
            is_emergency_access: false,
            emergency_expiry: None,
        }
    }

    /// Assigns the responsible doctor.
    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = doctor_id.into();
        self
    }

    /// Attaches a stored document by name and content address.
    pub fn with_attachment(
        mut self,
        file_name: impl Into<String>,
        file_reference: impl Into<String>,
    ) -> Self {
        self.file_name = Some(file_name.into());
        self.file_reference = Some(file_reference.into());
        self
    }

    /// Marks the record as the audit entry of an emergency grant expiring at `expiry`.
    pub fn with_emergency_expiry(mut self, expiry: UnixMillis) -> Self {
        self.is_emergency_access = true;
        self.emergency_expiry = Some(expiry);
        self
    }

    /// Returns true once a doctor is assigned.
    pub fn has_doctor(&self) -> bool {
        !self.doctor_id.is_empty()
    }

    /// The sentinel payload of block 0.
    pub fn genesis(timestamp: UnixMillis) -> Self {
        Self::new(
            "genesis",
            "",
            RecordKind::Diagnosis,
            GENESIS_TITLE,
            "Healthcare Blockchain Genesis Block",
            timestamp,
        )
    }
}

/// Title carried by the genesis payload.
pub const GENESIS_TITLE: &str = "Genesis Block";
