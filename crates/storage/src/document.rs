// Path: crates/storage/src/document.rs
use medchain_crypto::DocumentKey;
use medchain_types::app::UnixMillis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata of a stored document.
///
/// `encryption_key` is populated only on values handed to the owning patient:
/// the result of `upload` and the patient's own `get`. Listings and reads by
/// doctors never carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub file_name: String,
    /// MIME type as declared by the uploader. May be empty.
    pub file_type: String,
    pub file_size: u64,
    pub upload_date: UnixMillis,
    pub content_address: String,
    pub encryption_key: Option<DocumentKey>,
    pub patient_id: String,
    /// The doctor the document is assigned to, if any.
    pub doctor_id: Option<String>,
    pub is_encrypted: bool,
}

impl StoredDocument {
    /// A copy without key material.
    pub fn redacted(&self) -> Self {
        Self {
            encryption_key: None,
            ..self.clone()
        }
    }

    /// The assigned doctor, or `""` when unassigned.
    pub fn assigned_doctor(&self) -> &str {
        self.doctor_id.as_deref().unwrap_or("")
    }
}

/// A file handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub file_type: String,
    /// Declared size. Must equal `bytes.len()`.
    pub file_size: u64,
    pub patient_id: String,
    pub doctor_id: Option<String>,
}

impl DocumentUpload {
    /// An upload whose declared size is taken from `bytes`.
    pub fn new(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        patient_id: impl Into<String>,
    ) -> Self {
        Self {
            file_size: bytes.len() as u64,
            bytes,
            file_name: file_name.into(),
            file_type: file_type.into(),
            patient_id: patient_id.into(),
            doctor_id: None,
        }
    }

    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }
}

/// Aggregate view of the store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub total_documents: u64,
    /// Sum of plaintext sizes in bytes.
    pub total_size: u64,
    /// Document count per declared file type; `"unknown"` for an empty type.
    pub counts_by_type: BTreeMap<String, u64>,
}
