//! # Hybrid Order-Data Encryption
//!
//! Order data travels as a zlib stream encrypted with AES-128-CBC under a
//! one-time transaction key, and the transaction key travels RSA-encrypted
//! under the recipient's encryption ("E") key.
//!
//! ## Interoperability contract
//!
//! - Transaction key: 16 bytes, RSA PKCS#1 v1.5 encryption padding.
//! - Payload: AES-128-CBC with the all-zero IV. The sender pads with
//!   ANSI X9.23; the receiver does not unpad at the cipher layer because
//!   the zlib stream is self-delimiting and inflate ignores trailing bytes.
//! - Compression: zlib with header and Adler-32 trailer.
//!
//! RSA and AES succeed on almost any wrong input at the byte level, so a
//! failed inflate is the main signal of wrong key material, corruption, or
//! tampering.

use aes::Aes128;
use cbc::cipher::block_padding::{AnsiX923, NoPadding};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use miniz_oxide::inflate::TINFLStatus;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use zeroize::Zeroizing;

use ebics_core::{
    CryptoError, DecryptConfig, EncryptedOrderData, KeyMaterial, KeyRing, KeyRole,
    PlaintextOrderData, AES_BLOCK_LEN,
};

type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// Length of the AES-128 transaction key.
pub const TRANSACTION_KEY_LEN: usize = 16;

/// zlib level used for outgoing order data.
pub const COMPRESSION_LEVEL: u8 = 6;

const ZERO_IV: [u8; AES_BLOCK_LEN] = [0u8; AES_BLOCK_LEN];

/// Decrypt order data with the key ring's encryption key and default limits.
pub fn decrypt_order_data(
    key_ring: &KeyRing,
    encrypted: &EncryptedOrderData,
) -> Result<PlaintextOrderData, CryptoError> {
    decrypt_order_data_with(key_ring, encrypted, &DecryptConfig::default())
}

/// Decrypt order data with the key ring's encryption key.
///
/// # Errors
///
/// - [`CryptoError::MissingKeyMaterial`] without an encryption private key.
/// - [`CryptoError::InvalidKeyFormat`] if that key cannot be unlocked.
/// - [`CryptoError::DecryptionFailure`] if the transaction key cannot be
///   unwrapped, is not 16 bytes, or the payload is not block-aligned.
/// - [`CryptoError::DecompressionFailure`] if inflate fails or exceeds
///   `config.max_plaintext_len`.
pub fn decrypt_order_data_with(
    key_ring: &KeyRing,
    encrypted: &EncryptedOrderData,
    config: &DecryptConfig,
) -> Result<PlaintextOrderData, CryptoError> {
    let transaction_key = {
        let private_key = key_ring.unlock(KeyRole::Encryption)?;
        unwrap_transaction_key(&private_key, encrypted.transaction_key())?
    };
    let compressed = aes_cbc_decrypt(&transaction_key, encrypted.payload())?;
    let plaintext = inflate(&compressed, config.max_plaintext_len)?;

    tracing::debug!(
        payload_len = encrypted.payload().len(),
        plaintext_len = plaintext.len(),
        "decrypted order data"
    );
    Ok(PlaintextOrderData::new(plaintext))
}

/// Encrypt order data for `recipient`, the holder of the matching
/// encryption private key.
///
/// A fresh transaction key is drawn from the OS CSPRNG for every call.
pub fn encrypt_order_data(
    recipient: &KeyMaterial,
    plaintext: &[u8],
) -> Result<EncryptedOrderData, CryptoError> {
    let public_key = recipient.public_key()?;
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(plaintext, COMPRESSION_LEVEL);

    let mut transaction_key = Zeroizing::new([0u8; TRANSACTION_KEY_LEN]);
    OsRng.fill_bytes(&mut transaction_key[..]);

    let payload = Aes128CbcEnc::new_from_slices(&transaction_key[..], &ZERO_IV)
        .map_err(|_| CryptoError::EncryptionFailure("invalid transaction key length".to_string()))?
        .encrypt_padded_vec_mut::<AnsiX923>(&compressed);
    let wrapped_key = public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, &transaction_key[..])
        .map_err(|e| CryptoError::EncryptionFailure(format!("transaction key wrap: {e}")))?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        payload_len = payload.len(),
        "encrypted order data"
    );
    Ok(EncryptedOrderData::new(wrapped_key, payload))
}

fn unwrap_transaction_key(
    private_key: &RsaPrivateKey,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() != private_key.size() {
        return Err(CryptoError::DecryptionFailure(format!(
            "transaction key ciphertext is {} bytes, expected {}",
            ciphertext.len(),
            private_key.size()
        )));
    }
    let key = private_key
        .decrypt_blinded(&mut OsRng, Pkcs1v15Encrypt, ciphertext)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::DecryptionFailure(format!("transaction key unwrap: {e}")))?;
    if key.len() != TRANSACTION_KEY_LEN {
        return Err(CryptoError::DecryptionFailure(format!(
            "transaction key is {} bytes, expected {TRANSACTION_KEY_LEN}",
            key.len()
        )));
    }
    Ok(key)
}

fn aes_cbc_decrypt(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if payload.len() % AES_BLOCK_LEN != 0 {
        return Err(CryptoError::DecryptionFailure(format!(
            "payload length {} is not a multiple of {AES_BLOCK_LEN}",
            payload.len()
        )));
    }
    Aes128CbcDec::new_from_slices(key, &ZERO_IV)
        .map_err(|_| CryptoError::DecryptionFailure("invalid transaction key length".to_string()))?
        .decrypt_padded_vec_mut::<NoPadding>(payload)
        .map_err(|_| CryptoError::DecryptionFailure("AES-CBC decryption failed".to_string()))
}

fn inflate(compressed: &[u8], limit: usize) -> Result<Vec<u8>, CryptoError> {
    miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(compressed, limit).map_err(|e| {
        if e.status == TINFLStatus::HasMoreOutput {
            CryptoError::DecompressionFailure(format!("order data exceeds {limit} bytes"))
        } else {
            CryptoError::DecompressionFailure(format!("zlib inflate: {:?}", e.status))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::block_padding::Pkcs7;
    use ebics_core::{HashAlgorithm, Passphrase};
    use std::sync::OnceLock;

    fn bank_key() -> &'static KeyMaterial {
        static KEY: OnceLock<KeyMaterial> = OnceLock::new();
        KEY.get_or_init(|| {
            let key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
            KeyMaterial::from_private_key(&key, None, HashAlgorithm::Sha256, 1).unwrap()
        })
    }

    fn key_ring() -> KeyRing {
        KeyRing::new().with_encryption_key(bank_key().clone())
    }

    fn recipient() -> KeyMaterial {
        KeyMaterial::public_only(bank_key().public_pem())
    }

    #[test]
    fn round_trip_selected_lengths() {
        for len in [0usize, 1, 16, 1000, 100_000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
            let encrypted = encrypt_order_data(&recipient(), &plaintext).unwrap();
            assert!(encrypted.is_block_aligned());
            assert_eq!(encrypted.transaction_key().len(), 128);
            let decrypted = decrypt_order_data(&key_ring(), &encrypted).unwrap();
            assert_eq!(decrypted.as_bytes(), plaintext.as_slice(), "length {len}");
        }
    }

    #[test]
    fn fresh_transaction_key_per_message() {
        let a = encrypt_order_data(&recipient(), b"same").unwrap();
        let b = encrypt_order_data(&recipient(), b"same").unwrap();
        assert_ne!(a.payload(), b.payload());
    }

    #[test]
    fn missing_encryption_key() {
        let encrypted = encrypt_order_data(&recipient(), b"x").unwrap();
        let ring = KeyRing::new().with_authorization_key(bank_key().clone());
        assert!(matches!(
            decrypt_order_data(&ring, &encrypted),
            Err(CryptoError::MissingKeyMaterial)
        ));
    }

    #[test]
    fn public_only_encryption_key_is_missing_material() {
        let encrypted = encrypt_order_data(&recipient(), b"x").unwrap();
        let ring = KeyRing::new().with_encryption_key(recipient());
        assert!(matches!(
            decrypt_order_data(&ring, &encrypted),
            Err(CryptoError::MissingKeyMaterial)
        ));
    }

    #[test]
    fn passphrase_protected_key_ring() {
        let passphrase = Passphrase::new("bank-e002");
        let key = bank_key().unlock(None).unwrap();
        let protected =
            KeyMaterial::from_private_key(&key, Some(&passphrase), HashAlgorithm::Sha256, 1_000)
                .unwrap();
        let encrypted = encrypt_order_data(&recipient(), b"<HAC/>").unwrap();

        let ring = KeyRing::new()
            .with_encryption_key(protected.clone())
            .with_passphrase(passphrase);
        assert_eq!(
            decrypt_order_data(&ring, &encrypted).unwrap().as_bytes(),
            b"<HAC/>"
        );

        let wrong = KeyRing::new()
            .with_encryption_key(protected)
            .with_passphrase(Passphrase::new("nope"));
        assert!(matches!(
            decrypt_order_data(&wrong, &encrypted),
            Err(CryptoError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn transaction_key_length_must_match_modulus() {
        let encrypted = encrypt_order_data(&recipient(), b"x").unwrap();
        let (mut key, payload) = encrypted.into_parts();
        key.pop();
        let truncated = EncryptedOrderData::new(key, payload);
        assert!(matches!(
            decrypt_order_data(&key_ring(), &truncated),
            Err(CryptoError::DecryptionFailure(_))
        ));
    }

    #[test]
    fn transaction_key_must_be_sixteen_bytes() {
        let public = bank_key().public_key().unwrap();
        let wrapped = public.encrypt(&mut OsRng, Pkcs1v15Encrypt, &[7u8; 24]).unwrap();
        let data = EncryptedOrderData::new(wrapped, vec![0u8; 32]);
        let err = decrypt_order_data(&key_ring(), &data).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailure(msg) if msg.contains("24 bytes")));
    }

    #[test]
    fn misaligned_payload_rejected() {
        let encrypted = encrypt_order_data(&recipient(), b"x").unwrap();
        let (key, mut payload) = encrypted.into_parts();
        payload.push(0);
        let data = EncryptedOrderData::new(key, payload);
        assert!(matches!(
            decrypt_order_data(&key_ring(), &data),
            Err(CryptoError::DecryptionFailure(_))
        ));
    }

    #[test]
    fn trailing_padding_of_any_scheme_is_tolerated() {
        let transaction_key = [0x5au8; TRANSACTION_KEY_LEN];
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(b"<Order/>", 9);
        let payload = Aes128CbcEnc::new_from_slices(&transaction_key, &ZERO_IV)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(&compressed);
        let wrapped = bank_key()
            .public_key()
            .unwrap()
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, &transaction_key)
            .unwrap();
        let data = EncryptedOrderData::new(wrapped, payload);
        assert_eq!(
            decrypt_order_data(&key_ring(), &data).unwrap().as_bytes(),
            b"<Order/>"
        );
    }

    #[test]
    fn wrong_recipient_fails() {
        let other = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let other =
            KeyMaterial::from_private_key(&other, None, HashAlgorithm::Sha256, 1).unwrap();
        let encrypted = encrypt_order_data(&recipient(), b"for the bank only").unwrap();
        let ring = KeyRing::new().with_encryption_key(other);
        assert!(decrypt_order_data(&ring, &encrypted).is_err());
    }

    #[test]
    fn plaintext_limit_enforced() {
        let encrypted = encrypt_order_data(&recipient(), &vec![b'A'; 10_000]).unwrap();
        let config = DecryptConfig {
            max_plaintext_len: 1_000,
        };
        let err = decrypt_order_data_with(&key_ring(), &encrypted, &config).unwrap_err();
        assert!(matches!(err, CryptoError::DecompressionFailure(msg) if msg.contains("1000")));
    }

    #[test]
    fn garbage_payload_fails_decompression() {
        let encrypted = encrypt_order_data(&recipient(), b"x").unwrap();
        let (key, payload) = encrypted.into_parts();
        let data = EncryptedOrderData::new(key, vec![0xff; payload.len()]);
        assert!(matches!(
            decrypt_order_data(&key_ring(), &data),
            Err(CryptoError::DecompressionFailure(_))
        ));
    }
}
