// Path: crates/storage/src/store.rs
//! The document store.

use crate::addressing::content_address;
use crate::document::{DocumentStats, DocumentUpload, StoredDocument};
use ahash::AHashMap;
use medchain_access::{check_access, AccessDecision, GrantRegistry};
use medchain_crypto::{DocumentCipher, DocumentKey, HashFunction};
use medchain_telemetry::{access_metrics, storage_metrics};
use medchain_types::app::{Clock, Role};
use medchain_types::config::StorageConfig;
use medchain_types::error::{DocumentError, ServiceError, ValidationError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Label under which stats count documents with no declared type.
pub const UNKNOWN_FILE_TYPE: &str = "unknown";

/// Metadata, key and ciphertext of one document. Never leaves the store.
#[derive(Debug)]
struct DocumentEntry {
    /// Metadata with `encryption_key` always `None`.
    meta: StoredDocument,
    key: DocumentKey,
    blob: Vec<u8>,
}

impl DocumentEntry {
    fn owner_view(&self) -> StoredDocument {
        StoredDocument {
            encryption_key: Some(self.key.clone()),
            ..self.meta.clone()
        }
    }
}

/// Encrypted documents keyed by document id.
///
/// Uploads and deletes take the map's write lock; reads, listings and stats
/// share the read lock. Encryption and decryption happen outside the lock.
#[derive(Debug)]
pub struct DocumentStore {
    config: StorageConfig,
    cipher: Arc<dyn DocumentCipher>,
    hasher: Arc<dyn HashFunction>,
    grants: Arc<GrantRegistry>,
    clock: Arc<dyn Clock>,
    documents: RwLock<AHashMap<String, DocumentEntry>>,
}

impl DocumentStore {
    pub fn new(
        config: StorageConfig,
        cipher: Arc<dyn DocumentCipher>,
        hasher: Arc<dyn HashFunction>,
        grants: Arc<GrantRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            cipher,
            hasher,
            grants,
            clock,
            documents: RwLock::new(AHashMap::new()),
        }
    }

    /// Encrypts and stores `upload` under a fresh id and key.
    ///
    /// The returned metadata carries the key, as the uploading patient is its
    /// rightful holder.
    pub fn upload(&self, upload: DocumentUpload) -> Result<StoredDocument, ServiceError> {
        let DocumentUpload {
            bytes,
            file_name,
            file_type,
            file_size,
            patient_id,
            doctor_id,
        } = upload;

        if patient_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("patient_id").into());
        }
        if file_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("file_name").into());
        }
        let actual = bytes.len() as u64;
        if actual > self.config.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: actual,
                limit: self.config.max_file_size,
            }
            .into());
        }
        if file_size != actual {
            return Err(ValidationError::SizeMismatch {
                declared: file_size,
                actual,
            }
            .into());
        }

        let upload_date = self.clock.now_ms();
        let content_address = content_address(
            self.config.addressing,
            self.hasher.as_ref(),
            &bytes,
            &file_name,
            file_size,
            upload_date,
        )
        .map_err(DocumentError::from)?;
        let key = DocumentKey::generate();
        let blob = self
            .cipher
            .encrypt(&key, &bytes)
            .map_err(DocumentError::from)?;

        let meta = StoredDocument {
            id: format!("doc-{}", uuid::Uuid::new_v4()),
            file_name,
            file_type,
            file_size,
            upload_date,
            content_address,
            encryption_key: None,
            patient_id,
            doctor_id: doctor_id.filter(|d| !d.is_empty()),
            is_encrypted: true,
        };
        let entry = DocumentEntry { meta, key, blob };
        let stored = entry.owner_view();

        let total = {
            let mut documents = self.documents.write();
            documents.insert(stored.id.clone(), entry);
            total_size(&documents)
        };

        let metrics = storage_metrics();
        metrics.inc_documents_uploaded();
        metrics.set_stored_bytes(total);
        tracing::info!(
            target: "storage",
            document_id = %stored.id,
            patient_id = %stored.patient_id,
            size = stored.file_size,
            address = %stored.content_address,
            cipher = self.cipher.name(),
            "Stored encrypted document"
        );
        Ok(stored)
    }

    /// Decrypts a document for `requester_id` acting as `role`.
    ///
    /// An unknown id yields `NotFound` before access is evaluated. The key is
    /// included in the returned metadata only for the owning patient.
    pub fn get(
        &self,
        document_id: &str,
        requester_id: &str,
        role: Role,
    ) -> Result<(StoredDocument, Vec<u8>), DocumentError> {
        let (meta, key, blob, decision) = {
            let documents = self.documents.read();
            let entry = documents
                .get(document_id)
                .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))?;
            let decision = self.decide(&entry.meta, requester_id, role);
            if !decision.is_allowed() {
                drop(documents);
                return Err(self.deny("get", document_id, requester_id, role));
            }
            let meta = match decision {
                AccessDecision::Owner => entry.owner_view(),
                _ => entry.meta.clone(),
            };
            (meta, entry.key.clone(), entry.blob.clone(), decision)
        };

        let content = self.cipher.decrypt(&key, &blob)?;
        storage_metrics().inc_documents_read();
        tracing::debug!(
            target: "storage",
            document_id,
            requester_id,
            via = decision.as_str(),
            "Document read"
        );
        Ok((meta, content))
    }

    /// Every document owned by `patient_id`, newest upload first.
    pub fn list_for_patient(&self, patient_id: &str) -> Vec<StoredDocument> {
        self.collect_sorted(|meta| meta.patient_id == patient_id)
    }

    /// Documents assigned to `doctor_id`, plus every document of a patient
    /// for whom the doctor holds an active emergency grant, newest first.
    pub fn list_for_doctor(&self, doctor_id: &str) -> Vec<StoredDocument> {
        if doctor_id.is_empty() {
            return Vec::new();
        }
        let granted = self.grants.patients_with_active_grant(doctor_id);
        self.collect_sorted(|meta| {
            meta.assigned_doctor() == doctor_id || granted.iter().any(|p| *p == meta.patient_id)
        })
    }

    fn collect_sorted(&self, pred: impl Fn(&StoredDocument) -> bool) -> Vec<StoredDocument> {
        let mut out: Vec<StoredDocument> = self
            .documents
            .read()
            .values()
            .filter(|e| pred(&e.meta))
            .map(|e| e.meta.clone())
            .collect();
        out.sort_by(|a, b| {
            b.upload_date
                .cmp(&a.upload_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    /// Removes a document and its ciphertext. Only the owning patient may.
    ///
    /// Returns `Ok(false)` when no such document exists.
    pub fn delete(
        &self,
        document_id: &str,
        requester_id: &str,
        role: Role,
    ) -> Result<bool, DocumentError> {
        let mut documents = self.documents.write();
        let Some(entry) = documents.get(document_id) else {
            return Ok(false);
        };
        if role != Role::Patient || entry.meta.patient_id != requester_id {
            drop(documents);
            return Err(self.deny("delete", document_id, requester_id, role));
        }
        documents.remove(document_id);
        let total = total_size(&documents);
        drop(documents);

        let metrics = storage_metrics();
        metrics.inc_documents_deleted();
        metrics.set_stored_bytes(total);
        tracing::info!(target: "storage", document_id, patient_id = requester_id, "Deleted document");
        Ok(true)
    }

    /// Counts and sizes across every stored document. Not access controlled.
    pub fn stats(&self) -> DocumentStats {
        let documents = self.documents.read();
        let mut stats = DocumentStats::default();
        for entry in documents.values() {
            stats.total_documents += 1;
            stats.total_size += entry.meta.file_size;
            let kind = if entry.meta.file_type.is_empty() {
                UNKNOWN_FILE_TYPE
            } else {
                entry.meta.file_type.as_str()
            };
            *stats.counts_by_type.entry(kind.to_string()).or_insert(0) += 1;
        }
        stats
    }

    /// Evaluates access to a stored document without reading it.
    ///
    /// `None` when the document does not exist.
    pub fn check_access(&self, document_id: &str, requester_id: &str, role: Role) -> Option<bool> {
        let documents = self.documents.read();
        documents
            .get(document_id)
            .map(|e| self.decide(&e.meta, requester_id, role).is_allowed())
    }

    /// Redacted metadata of one document, without access control.
    pub fn metadata(&self, document_id: &str) -> Option<StoredDocument> {
        self.documents
            .read()
            .get(document_id)
            .map(|e| e.meta.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn decide(&self, meta: &StoredDocument, requester_id: &str, role: Role) -> AccessDecision {
        check_access(
            &self.grants,
            requester_id,
            role,
            &meta.patient_id,
            meta.assigned_doctor(),
        )
    }

    fn deny(&self, operation: &'static str, document_id: &str, requester_id: &str, role: Role) -> DocumentError {
        access_metrics().inc_access_denied(operation);
        tracing::warn!(
            target: "storage",
            operation,
            document_id,
            requester_id,
            %role,
            "Document access denied"
        );
        DocumentError::AccessDenied(format!(
            "{role} {requester_id} may not {operation} document {document_id}"
        ))
    }
}

fn total_size(documents: &AHashMap<String, DocumentEntry>) -> u64 {
    documents.values().map(|e| e.meta.file_size).sum()
}

#[cfg(test)]
mod tests;
