//! # Configuration
//!
//! Tunables for key generation and decryption. Every field has a default,
//! so an empty file (or no file) is a valid configuration.
//!
//! ```yaml
//! keygen:
//!   bits: 2048
//!   pbkdf2_iterations: 100000
//!   hash: sha256
//! decrypt:
//!   max_plaintext_len: 268435456
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::digest::HashAlgorithm;
use crate::error::ConfigError;

/// Smallest RSA modulus the core will generate.
pub const MIN_RSA_BITS: usize = 1024;

/// Default RSA modulus size for new key pairs.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// Default PBKDF2 iteration count for passphrase-protected private keys.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Default bound on decompressed order data (256 MiB).
pub const DEFAULT_MAX_PLAINTEXT_LEN: usize = 256 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CryptoConfig {
    pub keygen: KeyGenConfig,
    pub decrypt: DecryptConfig,
}

/// Key pair generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyGenConfig {
    /// Modulus size for new key pairs.
    pub bits: usize,
    /// Requests below this size are rejected. Never below [`MIN_RSA_BITS`].
    pub min_bits: usize,
    /// PBKDF2 iterations when protecting a private key with a passphrase.
    pub pbkdf2_iterations: u32,
    /// PRF hash for passphrase protection.
    pub hash: HashAlgorithm,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_RSA_BITS,
            min_bits: MIN_RSA_BITS,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            hash: HashAlgorithm::Sha256,
        }
    }
}

/// Order-data decryption settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecryptConfig {
    /// Inflate output larger than this is rejected.
    pub max_plaintext_len: usize,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self {
            max_plaintext_len: DEFAULT_MAX_PLAINTEXT_LEN,
        }
    }
}

impl CryptoConfig {
    /// Load and validate a configuration file.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded crypto configuration");
        Ok(config)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let keygen = &self.keygen;
        if keygen.min_bits < MIN_RSA_BITS {
            return Err(ConfigError::Invalid(format!(
                "keygen.min_bits must be at least {MIN_RSA_BITS}, got {}",
                keygen.min_bits
            )));
        }
        if keygen.bits < keygen.min_bits {
            return Err(ConfigError::Invalid(format!(
                "keygen.bits ({}) is below keygen.min_bits ({})",
                keygen.bits, keygen.min_bits
            )));
        }
        if keygen.pbkdf2_iterations == 0 {
            return Err(ConfigError::Invalid(
                "keygen.pbkdf2_iterations must be positive".to_string(),
            ));
        }
        if self.decrypt.max_plaintext_len == 0 {
            return Err(ConfigError::Invalid(
                "decrypt.max_plaintext_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
