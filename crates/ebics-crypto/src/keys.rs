//! # Key Management: Generation, Components, and Fingerprints
//!
//! RSA key pair generation for the subscriber's own keys, and the
//! canonical public-key fingerprint exchanged during INI/HIA.
//!
//! ## Fingerprint format
//!
//! The fingerprint is the digest of the ASCII text
//! `<exponent-hex> <modulus-hex>`:
//!
//! 1. exponent and modulus rendered as lowercase hex, no `0x` prefix;
//! 2. if the exponent text is longer than the modulus text the two fields
//!    were encoded in swapped order upstream, so they are swapped back;
//! 3. leading `'0'` characters are stripped from each;
//! 4. one space separates the two.
//!
//! The remote party compares this value byte-for-byte.

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

use ebics_core::{
    CryptoError, DigestBytes, HashAlgorithm, KeyGenConfig, KeyMaterial, Passphrase,
    PublicKeyComponents,
};

/// Generates subscriber key pairs according to a [`KeyGenConfig`].
#[derive(Debug, Clone, Default)]
pub struct KeyManager {
    config: KeyGenConfig,
}

impl KeyManager {
    pub fn new(config: KeyGenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeyGenConfig {
        &self.config
    }

    /// Generate an RSA key pair of `bits` bits.
    ///
    /// With a passphrase the private key is PKCS#8 PBES2 encrypted, using
    /// PBKDF2 with HMAC-`hash` as PRF. Without one `hash` is unused.
    pub fn generate_key_pair(
        &self,
        passphrase: Option<&Passphrase>,
        hash: HashAlgorithm,
        bits: usize,
    ) -> Result<KeyMaterial, CryptoError> {
        if bits < self.config.min_bits {
            return Err(CryptoError::KeyGeneration(format!(
                "requested {bits}-bit key is below the {}-bit minimum",
                self.config.min_bits
            )));
        }

        let key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let material =
            KeyMaterial::from_private_key(&key, passphrase, hash, self.config.pbkdf2_iterations)?;

        tracing::debug!(
            bits,
            hash = %hash,
            protected = passphrase.is_some(),
            "generated RSA key pair"
        );
        Ok(material)
    }

    /// Generate a key pair with the configured size and hash.
    pub fn generate_default(
        &self,
        passphrase: Option<&Passphrase>,
    ) -> Result<KeyMaterial, CryptoError> {
        self.generate_key_pair(passphrase, self.config.hash, self.config.bits)
    }
}

/// Raw big-endian exponent and modulus of `key`'s public half.
pub fn public_key_components(key: &KeyMaterial) -> Result<PublicKeyComponents, CryptoError> {
    key.public_key_components()
}

/// The canonical `<exponent-hex> <modulus-hex>` text that gets hashed.
pub fn fingerprint_text(components: &PublicKeyComponents) -> String {
    let mut exponent = hex::encode(components.exponent());
    let mut modulus = hex::encode(components.modulus());

    // Some producers emit the modulus in the exponent slot and vice versa.
    if exponent.len() > modulus.len() {
        tracing::warn!(
            exponent_hex_len = exponent.len(),
            modulus_hex_len = modulus.len(),
            "public key exponent is longer than its modulus; swapping fields for fingerprint"
        );
        std::mem::swap(&mut exponent, &mut modulus);
    }

    format!(
        "{} {}",
        exponent.trim_start_matches('0'),
        modulus.trim_start_matches('0')
    )
}

/// Digest of the canonical fingerprint text of already-extracted components.
pub fn components_digest(components: &PublicKeyComponents, hash: HashAlgorithm) -> DigestBytes {
    hash.digest(fingerprint_text(components).as_bytes())
}

/// Canonical fingerprint of `certificate`'s public key.
pub fn public_key_digest(
    certificate: &KeyMaterial,
    hash: HashAlgorithm,
) -> Result<DigestBytes, CryptoError> {
    let components = certificate.public_key_components()?;
    Ok(components_digest(&components, hash))
}
