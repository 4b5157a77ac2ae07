// Path: crates/ledger/tests/chain_properties.rs
use medchain_crypto::{fingerprint_for, HashFunction, Sha256Hash};
use medchain_ledger::Ledger;
use medchain_test_utils::fixtures::{RecordFixtures, T0};
use medchain_types::app::{leading_zero_digits, ManualClock};
use medchain_types::config::{FingerprintKind, LedgerConfig};
use proptest::prelude::*;
use std::sync::Arc;

fn ledger(difficulty: u32, kind: FingerprintKind) -> Ledger {
    let config = LedgerConfig {
        difficulty,
        fingerprint: kind,
        ..LedgerConfig::default()
    };
    Ledger::new(config, fingerprint_for(kind), Arc::new(ManualClock::new(T0))).unwrap()
}

fn assert_chain_invariants(ledger: &Ledger, hasher: &dyn HashFunction) {
    let blocks = ledger.blocks();
    for pair in blocks.windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);
        assert_eq!(block.index, prev.index + 1);
        assert_eq!(block.previous_hash, prev.hash);
        assert_eq!(hasher.fingerprint(&block.preimage()).unwrap(), block.hash);
        assert!(leading_zero_digits(&block.hash) >= ledger.difficulty() as usize);
    }
}

#[test]
fn legacy_fingerprint_chain_verifies() {
    let ledger = ledger(2, FingerprintKind::Rolling32);
    for i in 0..5 {
        ledger
            .append(RecordFixtures::diagnosis(&format!("r{i}"), "patient-1"))
            .unwrap();
    }
    assert_eq!(ledger.len(), 6);
    assert_eq!(ledger.last_block().hash.len(), 8);
    assert!(ledger.verify());
    assert_chain_invariants(&ledger, &*fingerprint_for(FingerprintKind::Rolling32));
}

#[test]
fn records_by_doctor_ignores_unassigned() {
    let ledger = ledger(1, FingerprintKind::Sha256);
    ledger
        .append(RecordFixtures::prescription("rx-1", "patient-1", "doctor-1"))
        .unwrap();
    ledger
        .append(RecordFixtures::diagnosis("dx-1", "patient-1"))
        .unwrap();
    ledger
        .append(RecordFixtures::prescription("rx-2", "patient-2", "doctor-1"))
        .unwrap();

    let ids: Vec<_> = ledger
        .records_by_doctor("doctor-1")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["rx-1", "rx-2"]);
    assert!(ledger.records_by_doctor("").is_empty());
    assert!(ledger.records_by_doctor("doctor-9").is_empty());
}

#[test]
fn chain_info_reports_tip() {
    let ledger = ledger(1, FingerprintKind::Sha256);
    let hash = ledger
        .append(RecordFixtures::diagnosis("dx-1", "patient-1"))
        .unwrap();
    let info = ledger.chain_info();
    assert_eq!(info.length, 2);
    assert!(info.is_valid);
    assert_eq!(info.last_block.hash, hash);
    assert_eq!(info.last_block.payload.id, "dx-1");
}

#[test]
fn genesis_is_not_a_record() {
    let ledger = ledger(1, FingerprintKind::Sha256);
    assert!(ledger.record("genesis").is_none());
    assert!(ledger.records_by_patient("").is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn records_by_patient_preserves_append_order(picks in proptest::collection::vec(0usize..3, 1..12)) {
        let patients = ["patient-a", "patient-b", "patient-c"];
        let ledger = ledger(1, FingerprintKind::Sha256);

        let mut expected: Vec<Vec<(String, String)>> = vec![Vec::new(); patients.len()];
        for (n, pick) in picks.iter().enumerate() {
            let id = format!("r{n}");
            let hash = ledger
                .append(RecordFixtures::diagnosis(&id, patients[*pick]))
                .unwrap();
            expected[*pick].push((id, hash));
        }

        for (i, patient) in patients.iter().enumerate() {
            let got: Vec<(String, String)> = ledger
                .records_by_patient(patient)
                .into_iter()
                .map(|r| (r.id, r.ledger_hash.unwrap()))
                .collect();
            prop_assert_eq!(&got, &expected[i]);
        }
        prop_assert!(ledger.verify());
        assert_chain_invariants(&ledger, &Sha256Hash);
    }
}
