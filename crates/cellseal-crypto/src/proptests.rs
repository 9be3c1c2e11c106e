//! Property-based tests for envelope sealing.
//!
//! - Roundtrip for arbitrary plaintexts and secrets
//! - Any single-bit flip in the envelope is rejected as an authentication failure
//! - Nonce freshness across repeated encryptions
//! - Arbitrary strings never panic the decoder

use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;

use crate::{CryptoBox, MacKeyDerivation, OpenErrorKind, PrimaryKey, HEADER_SIZE};

fn derivation() -> impl Strategy<Value = MacKeyDerivation> {
    prop_oneof![
        Just(MacKeyDerivation::Legacy),
        Just(MacKeyDerivation::HkdfSha512)
    ]
}

proptest! {
    /// decrypt(encrypt(P)) == P for every plaintext, key and secret.
    #[test]
    fn roundtrip(
        key in any::<[u8; 32]>(),
        secret in prop::collection::vec(any::<u8>(), 1..128),
        plaintext in prop::collection::vec(any::<u8>(), 0..512),
        derivation in derivation(),
    ) {
        let cb = CryptoBox::builder(PrimaryKey::from_bytes(key))
            .derivation(derivation)
            .build();
        let envelope = cb.encrypt(&plaintext, Some(&secret)).unwrap();
        let decrypted = cb.decrypt(&envelope, Some(&secret)).unwrap();
        prop_assert_eq!(plaintext, decrypted);
    }

    /// Flipping one bit anywhere (MAC, nonce or ciphertext) never yields plaintext.
    #[test]
    fn single_bit_flip_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..64),
        bit in any::<prop::sample::Index>(),
    ) {
        let cb = CryptoBox::new(PrimaryKey::from_bytes([0x11; 32]));
        let envelope = cb.encrypt(&plaintext, Some(b"secret")).unwrap();

        let mut raw = STANDARD.decode(&envelope).unwrap();
        let bit = bit.index(raw.len() * 8);
        raw[bit / 8] ^= 1 << (bit % 8);
        let tampered = STANDARD.encode(&raw);

        let err = cb.decrypt(&tampered, Some(b"secret")).unwrap_err();
        prop_assert_eq!(err.kind(), OpenErrorKind::Authentication);
    }

    /// Two encryptions of the same plaintext use different nonces.
    #[test]
    fn fresh_nonce_per_call(plaintext in prop::collection::vec(any::<u8>(), 1..100)) {
        let cb = CryptoBox::new(PrimaryKey::from_bytes([0x22; 32]));
        let e1 = STANDARD.decode(cb.encrypt(&plaintext, Some(b"s")).unwrap()).unwrap();
        let e2 = STANDARD.decode(cb.encrypt(&plaintext, Some(b"s")).unwrap()).unwrap();

        prop_assert_ne!(&e1[64..HEADER_SIZE], &e2[64..HEADER_SIZE]);
        prop_assert_ne!(&e1[HEADER_SIZE..], &e2[HEADER_SIZE..]);
    }

    /// Arbitrary input is rejected without panicking and without plaintext.
    #[test]
    fn arbitrary_input_rejected(input in ".*") {
        let cb = CryptoBox::new(PrimaryKey::from_bytes([0x33; 32]));
        prop_assert!(cb.decrypt(&input, Some(b"s")).is_err());
    }

    /// Short decoded inputs are malformed, never authentication failures.
    #[test]
    fn short_input_is_malformed(raw in prop::collection::vec(any::<u8>(), 0..HEADER_SIZE)) {
        let cb = CryptoBox::new(PrimaryKey::from_bytes([0x44; 32]));
        let err = cb.decrypt(&STANDARD.encode(&raw), Some(b"s")).unwrap_err();
        prop_assert_eq!(err.kind(), OpenErrorKind::Malformed);
    }
}
