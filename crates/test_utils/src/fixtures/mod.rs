//! Record and document fixtures

use medchain_types::app::{MedicalRecord, RecordKind, UnixMillis};

/// A fixed instant used as the starting point of `ManualClock`s in tests
/// (2024-01-01T00:00:00Z).
pub const T0: UnixMillis = 1_704_067_200_000;

/// Builders for typical ledger payloads.
pub struct RecordFixtures;

impl RecordFixtures {
    /// A prescription written by `doctor_id` for `patient_id`.
    pub fn prescription(id: &str, patient_id: &str, doctor_id: &str) -> MedicalRecord {
        MedicalRecord::new(
            id,
            patient_id,
            RecordKind::Prescription,
            "Amoxicillin 500mg",
            "Three times daily for seven days",
            T0,
        )
        .with_doctor(doctor_id)
    }

    /// A diagnosis with no doctor assigned yet.
    pub fn diagnosis(id: &str, patient_id: &str) -> MedicalRecord {
        MedicalRecord::new(
            id,
            patient_id,
            RecordKind::Diagnosis,
            "Seasonal influenza",
            "Rest and fluids",
            T0,
        )
    }

    /// A test report pointing at a stored document.
    pub fn test_report(id: &str, patient_id: &str, file_name: &str, reference: &str) -> MedicalRecord {
        MedicalRecord::new(
            id,
            patient_id,
            RecordKind::TestReport,
            "Blood panel",
            "Complete blood count",
            T0,
        )
        .with_attachment(file_name, reference)
    }
}

/// Sample upload payloads.
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A small text report.
    pub fn lab_report() -> &'static [u8] {
        b"CBC: WBC 6.1, RBC 4.8, HGB 14.2, PLT 250"
    }

    /// A binary payload standing in for an image scan.
    pub fn xray_scan() -> Vec<u8> {
        (0..4096u32).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
    }

    /// A payload of exactly `len` bytes.
    pub fn sized(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 256) as u8).collect()
    }
}
