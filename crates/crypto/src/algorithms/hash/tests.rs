//! Tests for fingerprint implementations

use super::{fingerprint_for, HashFunction, Rolling32Hash, Sha256Hash};
use medchain_types::config::FingerprintKind;
use proptest::prelude::*;

#[test]
fn test_hash_functions() {
    let message = b"test message";

    let sha = Sha256Hash;
    let rolling = Rolling32Hash;

    assert_eq!(sha.hash(message).unwrap().len(), sha.digest_size());
    assert_eq!(rolling.hash(message).unwrap().len(), rolling.digest_size());

    // Verify deterministic behavior
    assert_eq!(sha.hash(message).unwrap(), sha.hash(message).unwrap());
    assert_eq!(rolling.hash(message).unwrap(), rolling.hash(message).unwrap());
}

#[test]
fn test_sha256_known_vector() {
    let digest = Sha256Hash.fingerprint(b"abc").unwrap();
    assert_eq!(
        digest,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_rolling_matches_reference_arithmetic() {
    // "ab": h = 97, then h = 97 * 31 + 98 = 3105 = 0xc21
    assert_eq!(Rolling32Hash.fingerprint(b"ab").unwrap(), "00000c21");
    assert_eq!(Rolling32Hash.fingerprint(b"").unwrap(), "00000000");
}

#[test]
fn test_fingerprint_width_is_fixed() {
    for kind in [FingerprintKind::Sha256, FingerprintKind::Rolling32] {
        let f = fingerprint_for(kind);
        let short = f.fingerprint(b"").unwrap();
        let long = f.fingerprint(&[0xAB; 4096]).unwrap();
        assert_eq!(short.len(), f.digest_size() * 2, "{}", f.name());
        assert_eq!(long.len(), f.digest_size() * 2, "{}", f.name());
    }
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let f = Sha256Hash;
        prop_assert_eq!(f.fingerprint(&data).unwrap(), f.fingerprint(&data).unwrap());
        let hex = f.fingerprint(&data).unwrap();
        prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
