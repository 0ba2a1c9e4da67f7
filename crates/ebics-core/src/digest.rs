//! # Digests: Hash Algorithms and Raw Digest Bytes
//!
//! Defines `HashAlgorithm` and `DigestBytes`, the hash provider used by
//! fingerprinting and signing.
//!
//! ## Invariant
//!
//! Digests at this layer are raw binary. Hex and base64 renderings belong
//! to whoever embeds the value in a request; `to_hex()` exists for
//! diagnostics and tests only.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::CryptoError;

/// Hash algorithms the core can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the algorithm of the A006/X002/E002 profiles.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Size of the raw digest in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Compute the raw digest of `data`.
    pub fn digest(&self, data: &[u8]) -> DigestBytes {
        let bytes = match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        };
        DigestBytes {
            algorithm: *self,
            bytes,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    /// Parse `sha256`, `SHA-256`, `sha384`, ... case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.trim().to_string())),
        }
    }
}

/// A raw binary digest tagged with the algorithm that produced it.
///
/// [`DigestBytes::from_raw`] does not check the length; operations that
/// depend on a well-formed digest call [`DigestBytes::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestBytes {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl DigestBytes {
    /// Wrap digest bytes computed elsewhere, e.g. by the request builder.
    pub fn from_raw(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// The algorithm this digest claims to come from.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of digest bytes actually held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no digest bytes are held.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check that the length matches the algorithm's output size.
    pub fn validate(&self) -> Result<(), CryptoError> {
        let expected = self.algorithm.output_len();
        if self.bytes.len() != expected {
            return Err(CryptoError::InvalidDigestLength {
                algorithm: self.algorithm,
                expected,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Consume the digest, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for DigestBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Compute the raw digest of `data` with `algorithm`.
pub fn hash(data: &[u8], algorithm: HashAlgorithm) -> DigestBytes {
    algorithm.digest(data)
}

/// Compute the raw digest of `data` with the algorithm called `name`.
///
/// Fails with [`CryptoError::UnsupportedAlgorithm`] for unknown names.
pub fn hash_by_name(data: &[u8], name: &str) -> Result<DigestBytes, CryptoError> {
    let algorithm: HashAlgorithm = name.parse()?;
    Ok(algorithm.digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        let digest = hash(b"abc", HashAlgorithm::Sha256);
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_output_len_matches_digest() {
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            let digest = hash(b"payload", alg);
            assert_eq!(digest.len(), alg.output_len());
            assert_eq!(digest.algorithm(), alg);
            digest.validate().unwrap();
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let d1 = hash(b"order data", HashAlgorithm::Sha256);
        let d2 = hash(b"order data", HashAlgorithm::Sha256);
        assert_eq!(d1, d2);
        assert_ne!(d1, hash(b"order datb", HashAlgorithm::Sha256));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(" Sha-384 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha384);
        assert_eq!("SHA512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = hash_by_name(b"x", "md5").unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedAlgorithm(name) if name == "md5"));
        assert!("ripemd160".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_validate_rejects_short_digest() {
        let digest = DigestBytes::from_raw(HashAlgorithm::Sha256, vec![0u8; 20]);
        let err = digest.validate().unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidDigestLength { expected: 32, actual: 20, .. }
        ));
    }

    #[test]
    fn test_serde_lowercase_name() {
        let json = serde_json::to_string(&HashAlgorithm::Sha512).unwrap();
        assert_eq!(json, "\"sha512\"");
        let parsed: HashAlgorithm = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha256);
    }

    #[test]
    fn test_display() {
        assert_eq!(HashAlgorithm::Sha256.to_string(), "sha256");
        assert_eq!(HashAlgorithm::Sha384.to_string(), "sha384");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_algorithm() -> impl Strategy<Value = HashAlgorithm> {
        prop_oneof![
            Just(HashAlgorithm::Sha256),
            Just(HashAlgorithm::Sha384),
            Just(HashAlgorithm::Sha512),
        ]
    }

    proptest! {
        /// Every computed digest passes its own length validation.
        #[test]
        fn digest_len_matches_algorithm(
            data in prop::collection::vec(any::<u8>(), 0..512),
            alg in any_algorithm(),
        ) {
            let digest = hash(&data, alg);
            prop_assert_eq!(digest.len(), alg.output_len());
            prop_assert!(digest.validate().is_ok());
        }

        /// Name parsing ignores case and the hyphen.
        #[test]
        fn parse_ignores_case(alg in any_algorithm(), upper in any::<bool>()) {
            let name = if upper {
                alg.as_str().to_ascii_uppercase().replacen("SHA", "SHA-", 1)
            } else {
                alg.as_str().to_string()
            };
            prop_assert_eq!(name.parse::<HashAlgorithm>().unwrap(), alg);
        }
    }
}
