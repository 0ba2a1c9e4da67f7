//! # Protocol Property Tests
//!
//! End-to-end checks of the properties a bank relies on when it talks to
//! this core: signatures verify with a stock PKCS#1 v1.5 verifier, order
//! data round-trips through encryption and decryption, and tampering with
//! the ciphertext is detected.
//!
//! All tests use real keys. The 2048-bit key is generated once and shared.

use std::collections::HashSet;
use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::Sha256;

use ebics_core::{
    hash, CryptoError, EncryptedOrderData, HashAlgorithm, KeyGenConfig, KeyMaterial, KeyRing,
    Passphrase,
};
use ebics_crypto::{
    decrypt_order_data, encrypt_order_data, generate_nonce, public_key_digest, sign, verify,
    KeyManager,
};

/// A subscriber whose E and X slots hold the same 2048-bit key.
fn subscriber() -> &'static (RsaPrivateKey, KeyMaterial) {
    static KEY: OnceLock<(RsaPrivateKey, KeyMaterial)> = OnceLock::new();
    KEY.get_or_init(|| {
        let key = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation");
        let material = KeyMaterial::from_private_key(&key, None, HashAlgorithm::Sha256, 1)
            .expect("PEM encoding");
        (key, material)
    })
}

fn key_ring() -> KeyRing {
    let (_, material) = subscriber();
    KeyRing::new()
        .with_encryption_key(material.clone())
        .with_authorization_key(material.clone())
}

fn certificate() -> KeyMaterial {
    KeyMaterial::public_only(subscriber().1.public_pem())
}

// -- Signatures --------------------------------------------------------------

#[test]
fn signature_verifies_with_standard_verifier() {
    let digest = hash(b"<ebicsRequest>...</ebicsRequest>", HashAlgorithm::Sha256);
    let signature = sign(&key_ring(), &digest).unwrap();
    assert_eq!(signature.len(), 256);

    let public = subscriber().0.to_public_key();
    public
        .verify(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes(), &signature)
        .unwrap();
    verify(&certificate(), &digest, &signature).unwrap();
}

#[test]
fn distinct_digests_give_distinct_signatures() {
    let ring = key_ring();
    let signatures: HashSet<Vec<u8>> = (0..8)
        .map(|i| {
            let digest = hash(format!("request {i}").as_bytes(), HashAlgorithm::Sha256);
            sign(&ring, &digest).unwrap()
        })
        .collect();
    assert_eq!(signatures.len(), 8);
}

#[test]
fn signing_with_only_encryption_key_fails() {
    let ring = KeyRing::new().with_encryption_key(subscriber().1.clone());
    let err = sign(&ring, &hash(b"x", HashAlgorithm::Sha256)).unwrap_err();
    assert!(matches!(err, CryptoError::MissingAuthCertificate));
}

// -- Order data --------------------------------------------------------------

#[test]
fn order_data_round_trips() {
    let ring = key_ring();
    let recipient = certificate();
    for len in [0usize, 1, 16, 1000, 100_000] {
        let mut plaintext = vec![0u8; len];
        OsRng.fill_bytes(&mut plaintext);
        let encrypted = encrypt_order_data(&recipient, &plaintext).unwrap();
        assert_eq!(encrypted.transaction_key().len(), 256);
        assert!(encrypted.is_block_aligned());
        let decrypted = decrypt_order_data(&ring, &encrypted).unwrap();
        assert_eq!(decrypted.as_bytes(), plaintext.as_slice(), "length {len}");
    }
}

#[test]
fn decrypt_without_encryption_key_fails() {
    let encrypted = encrypt_order_data(&certificate(), b"pain.001").unwrap();
    let ring = KeyRing::new().with_authorization_key(subscriber().1.clone());
    let err = decrypt_order_data(&ring, &encrypted).unwrap_err();
    assert!(matches!(err, CryptoError::MissingKeyMaterial));
}

#[test]
fn single_bit_flips_are_detected() {
    // A 1024-bit key keeps the thousand RSA unwraps quick.
    let key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
    let material = KeyMaterial::from_private_key(&key, None, HashAlgorithm::Sha256, 1).unwrap();
    let ring = KeyRing::new().with_encryption_key(material.clone());

    let mut plaintext = vec![0u8; 64 * 1024];
    OsRng.fill_bytes(&mut plaintext);
    let (transaction_key, payload) = encrypt_order_data(&material, &plaintext)
        .unwrap()
        .into_parts();

    let trials = 1000;
    let mut detected = 0;
    for _ in 0..trials {
        let mut tampered = payload.clone();
        let bit = OsRng.gen_range(0..tampered.len() * 8);
        tampered[bit / 8] ^= 1 << (bit % 8);
        let data = EncryptedOrderData::new(transaction_key.clone(), tampered);
        if let Err(CryptoError::DecompressionFailure(_)) = decrypt_order_data(&ring, &data) {
            detected += 1;
        }
    }
    assert!(detected >= 999, "only {detected}/{trials} flips detected");
}

// -- Keys and nonces ---------------------------------------------------------

#[test]
fn generated_key_fingerprint_survives_pem_round_trip() {
    let passphrase = Passphrase::new("subscriber secret");
    let manager = KeyManager::new(KeyGenConfig {
        pbkdf2_iterations: 1_000,
        ..KeyGenConfig::default()
    });
    let material = manager
        .generate_key_pair(Some(&passphrase), HashAlgorithm::Sha256, 1024)
        .unwrap();
    let public = KeyMaterial::public_only(material.public_pem());
    assert_eq!(
        public_key_digest(&material, HashAlgorithm::Sha256).unwrap(),
        public_key_digest(&public, HashAlgorithm::Sha256).unwrap()
    );
}

#[test]
fn nonces_are_unique_and_well_formed() {
    let nonces: HashSet<String> = (0..1000).map(|_| generate_nonce()).collect();
    assert_eq!(nonces.len(), 1000);
    for nonce in &nonces {
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F')));
    }
}
