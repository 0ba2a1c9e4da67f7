//! # ebics-cli: Command-Line Interface for the EBICS Crypto Core
//!
//! Exposes the `ebics-crypto` operations over PEM and binary files so key
//! letters, test signatures, and captured order data can be handled
//! without writing code.
//!
//! ## Subcommands
//!
//! - `ebics keygen`: generate an E or X key pair as PEM files.
//! - `ebics fingerprint`: public-key fingerprint for the INI/HIA letter.
//! - `ebics components`: exponent and modulus of a public key.
//! - `ebics nonce`: request nonces.
//! - `ebics sign` / `ebics verify`: authorization signatures over a digest.
//! - `ebics encrypt` / `ebics decrypt`: hybrid order-data encryption.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers; handlers delegate to
//!   the library crates and hold no cryptographic logic of their own.
//! - Passphrases come from environment variables, never from argv.
//! - Results go to stdout, diagnostics to stderr via `tracing`.

pub mod keys;
pub mod nonce;
pub mod order;
pub mod signing;

use std::path::Path;

use anyhow::{bail, Context, Result};

use ebics_core::{DigestBytes, HashAlgorithm, KeyMaterial, Passphrase};

/// Read a UTF-8 file, naming `what` in the error.
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what}: {}", path.display()))
}

/// Read a binary file, naming `what` in the error.
pub fn read_bytes(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {what}: {}", path.display()))
}

/// Load a public-key PEM (PKCS#1 or SubjectPublicKeyInfo).
pub fn load_public_key(path: &Path) -> Result<KeyMaterial> {
    let pem = read_text(path, "public key")?;
    Ok(KeyMaterial::public_only(pem))
}

/// Load a key pair from its private and public PEM files.
pub fn load_key_pair(private: &Path, public: &Path) -> Result<KeyMaterial> {
    let public_pem = read_text(public, "public key")?;
    let private_pem = read_text(private, "private key")?;
    Ok(KeyMaterial::new(public_pem, private_pem))
}

/// Read a passphrase from the environment variable named `var`.
///
/// `None` means no passphrase. A named but unset variable is an error so a
/// typo does not silently produce an unprotected key.
pub fn passphrase_from_env(var: Option<&str>) -> Result<Option<Passphrase>> {
    let Some(var) = var else {
        return Ok(None);
    };
    match std::env::var(var) {
        Ok(value) if value.is_empty() => bail!("passphrase variable {var} is empty"),
        Ok(value) => Ok(Some(Passphrase::new(value))),
        Err(_) => bail!("passphrase variable {var} is not set"),
    }
}

/// Parse a hex-encoded digest. Length is checked by the consuming operation.
pub fn parse_digest(hex_digest: &str, algorithm: HashAlgorithm) -> Result<DigestBytes> {
    let bytes = hex::decode(hex_digest.trim()).context("digest is not valid hex")?;
    Ok(DigestBytes::from_raw(algorithm, bytes))
}

/// Write `contents` to `path`, readable by the owner only on Unix.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions: {}", path.display()))?;
    }
    Ok(())
}
