// Path: crates/node/src/service.rs
//! The medical record service facade.

use medchain_access::{check_access, GrantRegistry, GrantRequest};
use medchain_crypto::{fingerprint_for, ChaChaDocumentCipher};
use medchain_ledger::{Ledger, MiningWorker};
use medchain_storage::{DocumentStats, DocumentStore, DocumentUpload, StoredDocument};
use medchain_telemetry::{access_metrics, error_metrics};
use medchain_types::app::{ChainInfo, Clock, EmergencyAccessGrant, MedicalRecord, RecordKind, Role};
use medchain_types::config::NodeConfig;
use medchain_types::error::{ErrorCode, ServiceError, ValidationError};
use std::sync::Arc;

/// Title of the audit record appended for every emergency grant.
pub const EMERGENCY_RECORD_TITLE: &str = "Emergency Access Granted";

/// Result of the patient upload flow.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// The stored document, key included.
    pub document: StoredDocument,
    /// The ledger record referencing it, with `ledger_hash` set.
    pub record: MedicalRecord,
}

/// Result of a granted emergency access request.
#[derive(Debug, Clone)]
pub struct EmergencyAccessReceipt {
    pub grant: EmergencyAccessGrant,
    /// The audit record, with `ledger_hash` set.
    pub record: MedicalRecord,
}

/// The single entry point for collaborators: record submission, the upload
/// flow, emergency access and access-gated reads.
///
/// Constructed once at start-up; every component is owned here and shared by
/// `Arc`, never reached through globals.
#[derive(Debug)]
pub struct MedicalRecordService {
    clock: Arc<dyn Clock>,
    ledger: Arc<Ledger>,
    worker: MiningWorker,
    grants: Arc<GrantRegistry>,
    documents: Arc<DocumentStore>,
}

impl MedicalRecordService {
    /// Validates `config` and builds every component. Opens the ledger
    /// journal when one is configured.
    pub fn new(config: NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, ServiceError> {
        config.validate()?;

        let hasher = fingerprint_for(config.ledger.fingerprint);
        let ledger = Arc::new(Ledger::open(config.ledger, hasher.clone(), clock.clone())?);
        let grants = Arc::new(GrantRegistry::new(config.emergency, clock.clone()));
        let documents = Arc::new(DocumentStore::new(
            config.storage,
            Arc::new(ChaChaDocumentCipher),
            hasher,
            grants.clone(),
            clock.clone(),
        ));

        Ok(Self {
            clock,
            worker: MiningWorker::new(ledger.clone()),
            ledger,
            grants,
            documents,
        })
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn grants(&self) -> &Arc<GrantRegistry> {
        &self.grants
    }

    pub fn documents(&self) -> &Arc<DocumentStore> {
        &self.documents
    }

    /// Appends a record after validating it. Assigns an id when none is given.
    pub async fn submit_record(&self, record: MedicalRecord) -> Result<String, ServiceError> {
        let record = prepare_record(record).map_err(observe)?;
        self.worker.append(record).await.map_err(observe)
    }

    /// Stores a file for its patient, then appends a record pointing at it.
    ///
    /// If the append fails the document is removed again, so no stored file
    /// is left without a ledger record.
    pub async fn upload_with_record(
        &self,
        upload: DocumentUpload,
        kind: RecordKind,
        title: &str,
        description: &str,
    ) -> Result<UploadReceipt, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(observe(ValidationError::EmptyField("title").into()));
        }

        let document = self.documents.upload(upload).map_err(observe)?;
        let mut record = MedicalRecord::new(
            new_record_id(),
            document.patient_id.clone(),
            kind,
            title,
            description.trim(),
            document.upload_date,
        )
        .with_attachment(document.file_name.clone(), document.content_address.clone());
        if let Some(doctor) = &document.doctor_id {
            record = record.with_doctor(doctor.clone());
        }

        match self.worker.append(record.clone()).await {
            Ok(hash) => {
                record.ledger_hash = Some(hash);
                Ok(UploadReceipt { document, record })
            }
            Err(e) => {
                tracing::warn!(
                    target: "node",
                    document_id = %document.id,
                    error = %e,
                    "Record append failed; removing uploaded document"
                );
                if let Err(rollback) =
                    self.documents
                        .delete(&document.id, &document.patient_id, Role::Patient)
                {
                    tracing::error!(target: "node", document_id = %document.id, error = %rollback, "Rollback failed");
                }
                Err(observe(e))
            }
        }
    }

    /// Opens a patient's data to a doctor for a limited time and writes the
    /// audit record to the ledger through the normal mining path.
    pub async fn request_emergency_access(
        &self,
        request: GrantRequest,
    ) -> Result<EmergencyAccessReceipt, ServiceError> {
        let grant = self.grants.grant(request).map_err(|e| observe(e.into()))?;

        let mut record = MedicalRecord::new(
            format!("emergency-record-{}", uuid::Uuid::new_v4()),
            grant.patient_id.clone(),
            RecordKind::EmergencyAccess,
            EMERGENCY_RECORD_TITLE,
            format!("Emergency access granted: {}", grant.reason),
            grant.created_at,
        )
        .with_doctor(grant.doctor_id.clone())
        .with_emergency_expiry(grant.expires_at);

        match self.worker.append(record.clone()).await {
            Ok(hash) => {
                record.ledger_hash = Some(hash);
                Ok(EmergencyAccessReceipt { grant, record })
            }
            Err(e) => {
                // An unaudited grant must not stay usable.
                if let Err(revoke) = self.grants.revoke(&grant.id, &grant.doctor_id) {
                    tracing::error!(target: "node", grant_id = %grant.id, error = %revoke, "Failed to withdraw unaudited grant");
                }
                Err(observe(e))
            }
        }
    }

    /// Ends a doctor's own grant early. The ledger is not touched.
    pub fn end_emergency_access(
        &self,
        grant_id: &str,
        doctor_id: &str,
    ) -> Result<EmergencyAccessGrant, ServiceError> {
        self.grants
            .revoke(grant_id, doctor_id)
            .map_err(|e| observe(e.into()))
    }

    /// A patient's ledger records, readable by the patient, by any doctor
    /// assigned to one of those records, or by a doctor with an active grant.
    ///
    /// Emergency audit records name the granted doctor but are not an
    /// assignment; access through them ends with the grant.
    pub fn patient_records(
        &self,
        requester_id: &str,
        role: Role,
        patient_id: &str,
    ) -> Result<Vec<MedicalRecord>, ServiceError> {
        let records = self.ledger.records_by_patient(patient_id);
        let allowed = check_access(&self.grants, requester_id, role, patient_id, "").is_allowed()
            || (role == Role::Doctor
                && records.iter().any(|r| {
                    r.kind != RecordKind::EmergencyAccess
                        && !r.is_emergency_access
                        && r.has_doctor()
                        && r.doctor_id == requester_id
                }));
        if !allowed {
            access_metrics().inc_access_denied("patient_records");
            tracing::warn!(target: "node", requester_id, %role, patient_id, "Record access denied");
            return Err(observe(ServiceError::AccessDenied(format!(
                "{role} {requester_id} may not read records of {patient_id}"
            ))));
        }
        Ok(records)
    }

    /// Records naming `doctor_id`, in chain order.
    pub fn doctor_records(&self, doctor_id: &str) -> Vec<MedicalRecord> {
        self.ledger.records_by_doctor(doctor_id)
    }

    pub fn active_grants_for_doctor(&self, doctor_id: &str) -> Vec<EmergencyAccessGrant> {
        self.grants.active_grants_for_doctor(doctor_id)
    }

    pub fn grants_for_patient(&self, patient_id: &str) -> Vec<EmergencyAccessGrant> {
        self.grants.grants_for_patient(patient_id)
    }

    pub fn upload_document(&self, upload: DocumentUpload) -> Result<StoredDocument, ServiceError> {
        self.documents.upload(upload).map_err(observe)
    }

    pub fn get_document(
        &self,
        document_id: &str,
        requester_id: &str,
        role: Role,
    ) -> Result<(StoredDocument, Vec<u8>), ServiceError> {
        self.documents
            .get(document_id, requester_id, role)
            .map_err(|e| observe(e.into()))
    }

    pub fn list_patient_documents(&self, patient_id: &str) -> Vec<StoredDocument> {
        self.documents.list_for_patient(patient_id)
    }

    pub fn list_doctor_documents(&self, doctor_id: &str) -> Vec<StoredDocument> {
        self.documents.list_for_doctor(doctor_id)
    }

    pub fn delete_document(
        &self,
        document_id: &str,
        requester_id: &str,
        role: Role,
    ) -> Result<bool, ServiceError> {
        self.documents
            .delete(document_id, requester_id, role)
            .map_err(|e| observe(e.into()))
    }

    pub fn document_stats(&self) -> DocumentStats {
        self.documents.stats()
    }

    /// Chain length, validity and tip. Walks the whole chain.
    pub fn chain_info(&self) -> ChainInfo {
        self.ledger.chain_info()
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }
}

fn prepare_record(mut record: MedicalRecord) -> Result<MedicalRecord, ServiceError> {
    record.title = record.title.trim().to_string();
    if record.title.is_empty() {
        return Err(ValidationError::EmptyField("title").into());
    }
    if record.patient_id.trim().is_empty() {
        return Err(ValidationError::EmptyField("patient_id").into());
    }
    if record.id.is_empty() {
        record.id = new_record_id();
    }
    Ok(record)
}

fn new_record_id() -> String {
    format!("record-{}", uuid::Uuid::new_v4())
}

/// Counts an error by its stable code before it is returned to the caller.
fn observe(err: ServiceError) -> ServiceError {
    let kind = match &err {
        ServiceError::Ledger(_) => "ledger",
        ServiceError::Document(_) => "document",
        ServiceError::Validation(_) => "validation",
        ServiceError::Grant(_) => "grant",
        ServiceError::AccessDenied(_) => "access",
        ServiceError::Worker(_) => "worker",
    };
    error_metrics().inc_error(kind, err.code());
    err
}
