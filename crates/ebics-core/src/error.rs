//! # Error Types
//!
//! Structured errors for every operation of the EBICS crypto core. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Every variant is terminal for the invoked operation. Nothing here is
//!   retried; retry policy belongs to the transport layer.
//! - Messages carry lengths, algorithm names, and library diagnostics only.
//!   Key bytes, passphrases, plaintext, and digests never appear in an error.

use thiserror::Error;

use crate::digest::HashAlgorithm;

/// Errors from cryptographic operations in the EBICS core.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The key ring has no encryption ("E") key with private material.
    #[error("missing encryption key material")]
    MissingKeyMaterial,

    /// The key ring has no authorization ("X") key with private material.
    #[error("missing authorization certificate")]
    MissingAuthCertificate,

    /// A key could not be parsed or unlocked.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// The named hash algorithm is not supported for this operation.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A digest does not have the output size of its algorithm.
    #[error("invalid {algorithm} digest length: expected {expected} bytes, got {actual}")]
    InvalidDigestLength {
        /// Algorithm the digest claims to come from.
        algorithm: HashAlgorithm,
        /// Output size of that algorithm.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// RSA unwrap of the transaction key or AES decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailure(String),

    /// zlib inflate of the decrypted order data failed.
    #[error("decompression failed: {0}")]
    DecompressionFailure(String),

    /// The RSA private-key transform did not produce a usable signature.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// RSA key pair generation or encoding failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A signature did not verify against the given public key.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// RSA wrap of the transaction key or AES encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),
}

/// Errors while loading or validating [`CryptoConfig`](crate::CryptoConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of its accepted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
