//! # Key Material: PEM Key Holders, Passphrases, and Key Rings
//!
//! `KeyMaterial` is an opaque holder of one RSA key pair in PEM form.
//! `KeyRing` aggregates the encryption ("E") and authorization ("X")
//! key material plus the passphrase shared by both.
//!
//! ## Security Invariant
//!
//! - Private keys are only usable through [`KeyMaterial::unlock`], which
//!   returns an owned `RsaPrivateKey`. The `rsa` crate zeroizes that value
//!   on drop, so an unlocked key lives exactly as long as the operation
//!   holding it.
//! - Private PEM text and passphrases live in `Zeroizing` buffers and are
//!   redacted from `Debug`. Neither type implements `Serialize`.
//!
//! ## Accepted encodings
//!
//! | PEM label | Meaning |
//! |---|---|
//! | `RSA PUBLIC KEY` | PKCS#1 public key |
//! | `PUBLIC KEY` | SubjectPublicKeyInfo |
//! | `RSA PRIVATE KEY` | PKCS#1 private key, unprotected |
//! | `PRIVATE KEY` | PKCS#8 private key, unprotected |
//! | `ENCRYPTED PRIVATE KEY` | PKCS#8 PBES2, passphrase-protected |

use pkcs8::der::pem::LineEnding;
use pkcs8::der::{pem, Decode};
use pkcs8::pkcs5::pbes2::{self, Pbkdf2Params, Pbkdf2Prf};
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, PrivateKeyInfo};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
    RsaPublicKey as Pkcs1PublicKey,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::digest::HashAlgorithm;
use crate::error::CryptoError;

const LABEL_PKCS1_PUBLIC: &str = "RSA PUBLIC KEY";
const LABEL_SPKI_PUBLIC: &str = "PUBLIC KEY";
const LABEL_PKCS1_PRIVATE: &str = "RSA PRIVATE KEY";
const LABEL_PKCS8_PRIVATE: &str = "PRIVATE KEY";
const LABEL_PKCS8_ENCRYPTED: &str = "ENCRYPTED PRIVATE KEY";

// ---------------------------------------------------------------------------
// KeyRole
// ---------------------------------------------------------------------------

/// The protocol role a key pair is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Encryption key ("E"): unwraps transaction keys.
    Encryption,
    /// Authorization key ("X"): signs request digests.
    Authorization,
}

impl KeyRole {
    /// Single-letter protocol code.
    pub fn letter(&self) -> char {
        match self {
            Self::Encryption => 'E',
            Self::Authorization => 'X',
        }
    }
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encryption => write!(f, "encryption (E)"),
            Self::Authorization => write!(f, "authorization (X)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Passphrase
// ---------------------------------------------------------------------------

/// A passphrase protecting private key material. Zeroized on drop.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// Take ownership of `passphrase`; the buffer is wiped on drop.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }

    /// UTF-8 bytes fed to the key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// An empty passphrase cannot protect a key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Passphrase(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// PublicKeyComponents
// ---------------------------------------------------------------------------

/// Raw big-endian exponent and modulus of an RSA public key.
///
/// Produced by a structural ASN.1 parse, without RSA parameter checks, so
/// that keys with swapped fields can still be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKeyComponents {
    exponent: Vec<u8>,
    modulus: Vec<u8>,
}

impl PublicKeyComponents {
    pub fn new(exponent: Vec<u8>, modulus: Vec<u8>) -> Self {
        Self { exponent, modulus }
    }

    /// Public exponent, big-endian.
    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    /// Modulus, big-endian.
    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }
}

// ---------------------------------------------------------------------------
// KeyMaterial
// ---------------------------------------------------------------------------

/// One RSA key pair in PEM form, private half optional.
#[derive(Clone)]
pub struct KeyMaterial {
    public_pem: String,
    private_pem: Option<Zeroizing<String>>,
}

impl KeyMaterial {
    /// Key material holding both halves.
    pub fn new(public_pem: impl Into<String>, private_pem: impl Into<String>) -> Self {
        Self {
            public_pem: public_pem.into(),
            private_pem: Some(Zeroizing::new(private_pem.into())),
        }
    }

    /// Encode `key` as key material.
    ///
    /// The public half is written as PKCS#1. The private half is PKCS#8
    /// PBES2 (PBKDF2 with HMAC-`prf`, AES-256-CBC) when a passphrase is
    /// given, otherwise unprotected PKCS#1 and `prf` is unused.
    pub fn from_private_key(
        key: &RsaPrivateKey,
        passphrase: Option<&Passphrase>,
        prf: HashAlgorithm,
        pbkdf2_iterations: u32,
    ) -> Result<Self, CryptoError> {
        let public_pem = key
            .to_public_key()
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("encode public key: {e}")))?;
        let private_pem = match passphrase {
            Some(passphrase) => encrypt_private_key(key, passphrase, prf, pbkdf2_iterations)?,
            None => key
                .to_pkcs1_pem(LineEnding::LF)
                .map_err(|e| CryptoError::KeyGeneration(format!("encode private key: {e}")))?,
        };
        Ok(Self {
            public_pem,
            private_pem: Some(private_pem),
        })
    }

    /// Key material holding only a public key, e.g. a bank key.
    pub fn public_only(public_pem: impl Into<String>) -> Self {
        Self {
            public_pem: public_pem.into(),
            private_pem: None,
        }
    }

    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }

    /// Private key PEM text, if present. Encrypted when passphrase-protected.
    pub fn private_pem(&self) -> Option<&str> {
        self.private_pem.as_deref().map(String::as_str)
    }

    pub fn has_private_key(&self) -> bool {
        self.private_pem.is_some()
    }

    /// Whether the private half is PKCS#8 PBES2 encrypted.
    pub fn is_passphrase_protected(&self) -> bool {
        self.private_pem()
            .and_then(|p| pem::decode_label(p.as_bytes()).ok())
            .is_some_and(|label| label == LABEL_PKCS8_ENCRYPTED)
    }

    /// Parse the public half into a validated RSA public key.
    pub fn public_key(&self) -> Result<RsaPublicKey, CryptoError> {
        let label = pem::decode_label(self.public_pem.as_bytes())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("public key PEM: {e}")))?;
        match label {
            LABEL_PKCS1_PUBLIC => RsaPublicKey::from_pkcs1_pem(&self.public_pem)
                .map_err(|e| CryptoError::InvalidKeyFormat(format!("PKCS#1 public key: {e}"))),
            LABEL_SPKI_PUBLIC => RsaPublicKey::from_public_key_pem(&self.public_pem)
                .map_err(|e| CryptoError::InvalidKeyFormat(format!("SPKI public key: {e}"))),
            other => Err(CryptoError::InvalidKeyFormat(format!(
                "unexpected public key PEM label: {other}"
            ))),
        }
    }

    /// Extract the raw exponent and modulus of the public half.
    pub fn public_key_components(&self) -> Result<PublicKeyComponents, CryptoError> {
        let (label, der) = pem::decode_vec(self.public_pem.as_bytes())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("public key PEM: {e}")))?;
        let pkcs1_der = match label {
            LABEL_PKCS1_PUBLIC => der,
            LABEL_SPKI_PUBLIC => {
                let spki = SubjectPublicKeyInfoRef::from_der(&der)
                    .map_err(|e| CryptoError::InvalidKeyFormat(format!("SPKI: {e}")))?;
                spki.subject_public_key.raw_bytes().to_vec()
            }
            other => {
                return Err(CryptoError::InvalidKeyFormat(format!(
                    "unexpected public key PEM label: {other}"
                )))
            }
        };
        let key = Pkcs1PublicKey::from_der(&pkcs1_der)
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("PKCS#1 public key: {e}")))?;
        Ok(PublicKeyComponents::new(
            key.public_exponent.as_bytes().to_vec(),
            key.modulus.as_bytes().to_vec(),
        ))
    }

    /// Unlock the private half with `passphrase`.
    ///
    /// The passphrase is ignored for unprotected encodings and required for
    /// `ENCRYPTED PRIVATE KEY`. Callers should drop the returned key as soon
    /// as the operation that needed it completes.
    pub fn unlock(&self, passphrase: Option<&Passphrase>) -> Result<RsaPrivateKey, CryptoError> {
        let private_pem = self
            .private_pem()
            .ok_or_else(|| CryptoError::InvalidKeyFormat("no private key present".to_string()))?;
        let label = pem::decode_label(private_pem.as_bytes())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("private key PEM: {e}")))?;
        match label {
            LABEL_PKCS8_ENCRYPTED => {
                let passphrase = passphrase.ok_or_else(|| {
                    CryptoError::InvalidKeyFormat(
                        "private key is passphrase-protected but no passphrase was supplied"
                            .to_string(),
                    )
                })?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(private_pem, passphrase.as_bytes())
                    .map_err(|_| {
                        CryptoError::InvalidKeyFormat(
                            "cannot decrypt private key: wrong passphrase or corrupt key"
                                .to_string(),
                        )
                    })
            }
            LABEL_PKCS1_PRIVATE => RsaPrivateKey::from_pkcs1_pem(private_pem)
                .map_err(|e| CryptoError::InvalidKeyFormat(format!("PKCS#1 private key: {e}"))),
            LABEL_PKCS8_PRIVATE => RsaPrivateKey::from_pkcs8_pem(private_pem)
                .map_err(|e| CryptoError::InvalidKeyFormat(format!("PKCS#8 private key: {e}"))),
            other => Err(CryptoError::InvalidKeyFormat(format!(
                "unexpected private key PEM label: {other}"
            ))),
        }
    }
}

fn pbkdf2_prf(hash: HashAlgorithm) -> Pbkdf2Prf {
    match hash {
        HashAlgorithm::Sha256 => Pbkdf2Prf::HmacWithSha256,
        HashAlgorithm::Sha384 => Pbkdf2Prf::HmacWithSha384,
        HashAlgorithm::Sha512 => Pbkdf2Prf::HmacWithSha512,
    }
}

fn encrypt_private_key(
    key: &RsaPrivateKey,
    passphrase: &Passphrase,
    prf: HashAlgorithm,
    pbkdf2_iterations: u32,
) -> Result<Zeroizing<String>, CryptoError> {
    if passphrase.is_empty() {
        return Err(CryptoError::KeyGeneration(
            "passphrase for key protection is empty".to_string(),
        ));
    }
    if pbkdf2_iterations == 0 {
        return Err(CryptoError::KeyGeneration(
            "PBKDF2 iteration count must be positive".to_string(),
        ));
    }

    let mut salt = [0u8; 16];
    let mut iv = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);
    let params = pbes2::Parameters {
        kdf: Pbkdf2Params {
            salt: &salt,
            iteration_count: pbkdf2_iterations,
            key_length: None,
            prf: pbkdf2_prf(prf),
        }
        .into(),
        encryption: pbes2::EncryptionScheme::Aes256Cbc { iv: &iv },
    };

    let der = key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::KeyGeneration(format!("encode private key: {e}")))?;
    let info = PrivateKeyInfo::from_der(der.as_bytes())
        .map_err(|e| CryptoError::KeyGeneration(format!("encode private key: {e}")))?;
    let encrypted = info
        .encrypt_with_params(params, passphrase.as_bytes())
        .map_err(|e| CryptoError::KeyGeneration(format!("encrypt private key: {e}")))?;
    encrypted
        .to_pem(LABEL_PKCS8_ENCRYPTED, LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(format!("encode private key: {e}")))
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let private = if self.has_private_key() {
            "<private>"
        } else {
            "<none>"
        };
        write!(
            f,
            "KeyMaterial(public: {} bytes PEM, private: {private})",
            self.public_pem.len()
        )
    }
}

// ---------------------------------------------------------------------------
// KeyRing
// ---------------------------------------------------------------------------

/// Encryption and authorization key material plus their shared passphrase.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    encryption: Option<KeyMaterial>,
    authorization: Option<KeyMaterial>,
    passphrase: Option<Passphrase>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encryption_key(mut self, key: KeyMaterial) -> Self {
        self.encryption = Some(key);
        self
    }

    pub fn with_authorization_key(mut self, key: KeyMaterial) -> Self {
        self.authorization = Some(key);
        self
    }

    pub fn with_passphrase(mut self, passphrase: Passphrase) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    pub fn encryption_key(&self) -> Option<&KeyMaterial> {
        self.encryption.as_ref()
    }

    pub fn authorization_key(&self) -> Option<&KeyMaterial> {
        self.authorization.as_ref()
    }

    pub fn passphrase(&self) -> Option<&Passphrase> {
        self.passphrase.as_ref()
    }

    /// Key material for `role`, if that slot is filled.
    pub fn key(&self, role: KeyRole) -> Option<&KeyMaterial> {
        match role {
            KeyRole::Encryption => self.encryption_key(),
            KeyRole::Authorization => self.authorization_key(),
        }
    }

    /// Unlock the private key for `role`.
    ///
    /// An empty slot, or a slot without private material, fails with
    /// [`CryptoError::MissingKeyMaterial`] for the encryption role and
    /// [`CryptoError::MissingAuthCertificate`] for the authorization role.
    pub fn unlock(&self, role: KeyRole) -> Result<RsaPrivateKey, CryptoError> {
        let key = self
            .key(role)
            .filter(|k| k.has_private_key())
            .ok_or(match role {
                KeyRole::Encryption => CryptoError::MissingKeyMaterial,
                KeyRole::Authorization => CryptoError::MissingAuthCertificate,
            })?;
        key.unlock(self.passphrase())
    }
}
