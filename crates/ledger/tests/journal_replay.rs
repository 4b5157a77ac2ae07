// Path: crates/ledger/tests/journal_replay.rs
use medchain_crypto::Sha256Hash;
use medchain_ledger::journal::{replay, JournalWriter};
use medchain_ledger::Ledger;
use medchain_test_utils::assert_err_code;
use medchain_test_utils::fixtures::{RecordFixtures, T0};
use medchain_types::app::ManualClock;
use medchain_types::config::LedgerConfig;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn open(path: &Path) -> Result<Ledger, medchain_types::error::LedgerError> {
    let config = LedgerConfig {
        difficulty: 1,
        journal_path: Some(path.to_path_buf()),
        ..LedgerConfig::default()
    };
    Ledger::open(config, Arc::new(Sha256Hash), Arc::new(ManualClock::new(T0)))
}

#[test]
fn reopened_ledger_has_same_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.journal");

    let (tip, genesis) = {
        let ledger = open(&path).unwrap();
        ledger
            .append(RecordFixtures::prescription("rx-1", "patient-1", "doctor-1"))
            .unwrap();
        let tip = ledger
            .append(RecordFixtures::diagnosis("dx-1", "patient-1"))
            .unwrap();
        (tip, ledger.block(0).unwrap())
    };

    let ledger = open(&path).unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.block(0).unwrap(), genesis);
    assert_eq!(ledger.last_block().hash, tip);
    assert!(ledger.verify());

    ledger
        .append(RecordFixtures::diagnosis("dx-2", "patient-1"))
        .unwrap();
    assert_eq!(replay(&path).unwrap().len(), 4);
    assert_eq!(ledger.records_by_patient("patient-1").len(), 3);
}

#[test]
fn tampered_journal_is_rejected() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.journal");
    {
        let ledger = open(&source).unwrap();
        ledger
            .append(RecordFixtures::diagnosis("dx-1", "patient-1"))
            .unwrap();
        ledger
            .append(RecordFixtures::diagnosis("dx-2", "patient-1"))
            .unwrap();
    }

    let mut blocks = replay(&source).unwrap();
    blocks[1].payload.title = "Altered".into();

    let forged = dir.path().join("forged.journal");
    let mut writer = JournalWriter::open(&forged).unwrap();
    for block in &blocks {
        writer.append(block).unwrap();
    }
    drop(writer);

    assert_err_code!(open(&forged), "LEDGER_CORRUPT_JOURNAL");
}
