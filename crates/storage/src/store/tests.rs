//! Tests for the document store

use super::*;
use medchain_access::GrantRequest;
use medchain_crypto::{ChaChaDocumentCipher, Sha256Hash};
use medchain_test_utils::fixtures::{DocumentFixtures, T0};
use medchain_test_utils::{assert_err_code, assert_ok};
use medchain_types::app::{AccessLevel, ManualClock};
use medchain_types::config::{AddressingMode, EmergencyConfig};

struct Harness {
    store: DocumentStore,
    grants: Arc<GrantRegistry>,
    clock: Arc<ManualClock>,
}

fn harness_with(config: StorageConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(T0));
    let grants = Arc::new(GrantRegistry::new(EmergencyConfig::default(), clock.clone()));
    let store = DocumentStore::new(
        config,
        Arc::new(ChaChaDocumentCipher),
        Arc::new(Sha256Hash),
        grants.clone(),
        clock.clone(),
    );
    Harness {
        store,
        grants,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(StorageConfig::default())
}

fn lab_report(patient: &str) -> DocumentUpload {
    DocumentUpload::new(
        DocumentFixtures::lab_report().to_vec(),
        "cbc.txt",
        "text/plain",
        patient,
    )
}

#[test]
fn test_upload_returns_key_to_owner() {
    let h = harness();
    let doc = assert_ok!(h.store.upload(lab_report("patient-1").with_doctor("doctor-1")));
    assert!(doc.id.starts_with("doc-"));
    assert!(doc.is_encrypted);
    assert_eq!(doc.upload_date, T0);
    assert_eq!(doc.doctor_id.as_deref(), Some("doctor-1"));
    let key = doc.encryption_key.clone().unwrap();

    let (owner_view, bytes) = h.store.get(&doc.id, "patient-1", Role::Patient).unwrap();
    assert_eq!(bytes, DocumentFixtures::lab_report());
    assert_eq!(owner_view.encryption_key, Some(key));

    let (doctor_view, bytes) = h.store.get(&doc.id, "doctor-1", Role::Doctor).unwrap();
    assert_eq!(bytes, DocumentFixtures::lab_report());
    assert!(doctor_view.encryption_key.is_none());
}

#[test]
fn test_ciphertext_differs_from_plaintext() {
    let h = harness();
    let doc = h.store.upload(lab_report("patient-1")).unwrap();
    let documents = h.store.documents.read();
    let entry = documents.get(&doc.id).unwrap();
    assert_ne!(entry.blob.as_slice(), DocumentFixtures::lab_report());
    assert!(entry.meta.encryption_key.is_none());
}

#[test]
fn test_access_matrix() {
    let h = harness();
    let doc = h
        .store
        .upload(lab_report("patient-1").with_doctor("doctor-1"))
        .unwrap();

    assert!(h.store.get(&doc.id, "patient-1", Role::Patient).is_ok());
    assert!(h.store.get(&doc.id, "doctor-1", Role::Doctor).is_ok());
    assert_err_code!(
        h.store.get(&doc.id, "doctor-2", Role::Doctor),
        "DOCUMENT_ACCESS_DENIED"
    );
    assert_err_code!(
        h.store.get(&doc.id, "patient-2", Role::Patient),
        "DOCUMENT_ACCESS_DENIED"
    );

    h.grants
        .grant(
            GrantRequest::new("patient-1", "doctor-2", AccessLevel::Full, "Trauma bay")
                .for_minutes(15),
        )
        .unwrap();
    assert!(h.store.get(&doc.id, "doctor-2", Role::Doctor).is_ok());
    assert_eq!(h.store.check_access(&doc.id, "doctor-2", Role::Doctor), Some(true));

    h.clock.advance_minutes(15);
    assert_err_code!(
        h.store.get(&doc.id, "doctor-2", Role::Doctor),
        "DOCUMENT_ACCESS_DENIED"
    );
    assert_eq!(h.store.check_access(&doc.id, "doctor-2", Role::Doctor), Some(false));
}

#[test]
fn test_missing_document_is_not_found_before_access() {
    let h = harness();
    assert_err_code!(
        h.store.get("doc-missing", "anyone", Role::Doctor),
        "DOCUMENT_NOT_FOUND"
    );
    assert_eq!(h.store.check_access("doc-missing", "anyone", Role::Doctor), None);
    assert!(!h.store.delete("doc-missing", "anyone", Role::Doctor).unwrap());
}

#[test]
fn test_delete_rules() {
    let h = harness();
    let doc = h
        .store
        .upload(lab_report("patient-1").with_doctor("doctor-1"))
        .unwrap();

    assert_err_code!(
        h.store.delete(&doc.id, "doctor-1", Role::Doctor),
        "DOCUMENT_ACCESS_DENIED"
    );
    assert_err_code!(
        h.store.delete(&doc.id, "patient-2", Role::Patient),
        "DOCUMENT_ACCESS_DENIED"
    );
    assert_eq!(h.store.len(), 1);

    assert!(h.store.delete(&doc.id, "patient-1", Role::Patient).unwrap());
    assert!(h.store.is_empty());
    assert_err_code!(
        h.store.get(&doc.id, "patient-1", Role::Patient),
        "DOCUMENT_NOT_FOUND"
    );
}

#[test]
fn test_listings_sorted_and_redacted() {
    let h = harness();
    let first = h.store.upload(lab_report("patient-1")).unwrap();
    h.clock.advance(1_000);
    let second = h
        .store
        .upload(lab_report("patient-1").with_doctor("doctor-1"))
        .unwrap();
    h.clock.advance(1_000);
    let other = h
        .store
        .upload(lab_report("patient-2").with_doctor("doctor-1"))
        .unwrap();

    let listed = h.store.list_for_patient("patient-1");
    let ids: Vec<_> = listed.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert!(listed.iter().all(|d| d.encryption_key.is_none()));

    let ids: Vec<_> = h
        .store
        .list_for_doctor("doctor-1")
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![other.id.clone(), second.id.clone()]);
    assert!(h.store.list_for_doctor("doctor-2").is_empty());

    h.grants
        .grant(GrantRequest::new("patient-1", "doctor-2", AccessLevel::Basic, "Collapse").for_minutes(5))
        .unwrap();
    let ids: Vec<_> = h
        .store
        .list_for_doctor("doctor-2")
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);

    h.clock.advance_minutes(5);
    assert!(h.store.list_for_doctor("doctor-2").is_empty());
}

#[test]
fn test_upload_validation() {
    let h = harness_with(StorageConfig {
        max_file_size: 16,
        ..StorageConfig::default()
    });
    assert_err_code!(
        h.store.upload(DocumentUpload::new(DocumentFixtures::sized(17), "big.bin", "", "patient-1")),
        "VALIDATION_FILE_TOO_LARGE"
    );

    let mut lying = DocumentUpload::new(DocumentFixtures::sized(8), "x.bin", "", "patient-1");
    lying.file_size = 9;
    assert_err_code!(h.store.upload(lying), "VALIDATION_SIZE_MISMATCH");

    assert_err_code!(
        h.store.upload(DocumentUpload::new(vec![1], "x.bin", "", " ")),
        "VALIDATION_EMPTY_FIELD"
    );
    assert!(h.store.is_empty());
}

#[test]
fn test_addressing_modes() {
    let h = harness();
    let a = h.store.upload(lab_report("patient-1")).unwrap();
    let b = h.store.upload(lab_report("patient-2")).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.content_address, b.content_address);
    assert!(a.content_address.starts_with("sha256-"));

    let legacy = harness_with(StorageConfig {
        addressing: AddressingMode::Attributes,
        ..StorageConfig::default()
    });
    let a = legacy.store.upload(lab_report("patient-1")).unwrap();
    legacy.clock.advance(1);
    let b = legacy.store.upload(lab_report("patient-1")).unwrap();
    assert!(a.content_address.starts_with("Qm"));
    assert_ne!(a.content_address, b.content_address);
}

#[test]
fn test_stats() {
    let h = harness();
    h.store.upload(lab_report("patient-1")).unwrap();
    h.store
        .upload(DocumentUpload::new(DocumentFixtures::xray_scan(), "chest.png", "image/png", "patient-1"))
        .unwrap();
    h.store
        .upload(DocumentUpload::new(DocumentFixtures::sized(10), "blob", "", "patient-2"))
        .unwrap();

    let stats = h.store.stats();
    assert_eq!(stats.total_documents, 3);
    assert_eq!(
        stats.total_size,
        (DocumentFixtures::lab_report().len() + DocumentFixtures::xray_scan().len() + 10) as u64
    );
    assert_eq!(stats.counts_by_type.get("text/plain"), Some(&1));
    assert_eq!(stats.counts_by_type.get("image/png"), Some(&1));
    assert_eq!(stats.counts_by_type.get(UNKNOWN_FILE_TYPE), Some(&1));
}
