//! # Authentication Signatures
//!
//! RSA PKCS#1 v1.5 signatures over a precomputed digest. The digest is
//! wrapped in its DER `DigestInfo` and the result goes through the RSA
//! private transform with block type 1 padding, so the output verifies
//! with any standard PKCS#1 v1.5 verifier for the same hash.
//!
//! The caller supplies the digest (of the canonicalized request); nothing
//! here hashes data.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Sign;

use ebics_core::{CryptoError, DigestBytes, HashAlgorithm, KeyMaterial, KeyRing, KeyRole};

/// DER `DigestInfo` header for SHA-256 (RFC 8017, section 9.2 note 1).
const SHA256_PREFIX: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

const SHA384_PREFIX: [u8; 19] = [
    0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02,
    0x05, 0x00, 0x04, 0x30,
];

const SHA512_PREFIX: [u8; 19] = [
    0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03,
    0x05, 0x00, 0x04, 0x40,
];

/// The DER `DigestInfo` header that precedes a digest of `algorithm`.
pub fn digest_info_prefix(algorithm: HashAlgorithm) -> &'static [u8] {
    match algorithm {
        HashAlgorithm::Sha256 => &SHA256_PREFIX,
        HashAlgorithm::Sha384 => &SHA384_PREFIX,
        HashAlgorithm::Sha512 => &SHA512_PREFIX,
    }
}

/// `DigestInfo` encoding of `digest`: header followed by the raw bytes.
///
/// Fails with [`CryptoError::InvalidDigestLength`] if the digest length
/// does not match its algorithm.
pub fn digest_info(digest: &DigestBytes) -> Result<Vec<u8>, CryptoError> {
    digest.validate()?;
    let prefix = digest_info_prefix(digest.algorithm());
    let mut info = Vec::with_capacity(prefix.len() + digest.len());
    info.extend_from_slice(prefix);
    info.extend_from_slice(digest.as_bytes());
    Ok(info)
}

/// Sign `digest` with the key ring's authorization ("X") key.
///
/// The signature is exactly as long as the key's modulus.
///
/// # Errors
///
/// - [`CryptoError::InvalidDigestLength`] before any key is touched.
/// - [`CryptoError::MissingAuthCertificate`] without an authorization
///   private key.
/// - [`CryptoError::InvalidKeyFormat`] if that key cannot be unlocked.
/// - [`CryptoError::SigningFailure`] if the RSA operation fails.
pub fn sign(key_ring: &KeyRing, digest: &DigestBytes) -> Result<Vec<u8>, CryptoError> {
    let info = digest_info(digest)?;
    let private_key = key_ring.unlock(KeyRole::Authorization)?;

    let signature = private_key
        .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new_unprefixed(), &info)
        .map_err(|e| CryptoError::SigningFailure(e.to_string()))?;
    if signature.len() != private_key.size() {
        return Err(CryptoError::SigningFailure(format!(
            "signature is {} bytes, expected {}",
            signature.len(),
            private_key.size()
        )));
    }

    tracing::debug!(
        hash = %digest.algorithm(),
        signature_len = signature.len(),
        "signed digest"
    );
    Ok(signature)
}

/// Verify `signature` over `digest` against `certificate`'s public key.
pub fn verify(
    certificate: &KeyMaterial,
    digest: &DigestBytes,
    signature: &[u8],
) -> Result<(), CryptoError> {
    let info = digest_info(digest)?;
    let public_key = certificate.public_key()?;
    public_key
        .verify(Pkcs1v15Sign::new_unprefixed(), &info, signature)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}
