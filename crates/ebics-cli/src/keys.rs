//! # Key Subcommands
//!
//! `keygen`, `fingerprint`, and `components`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Args, ValueEnum};

use ebics_core::{CryptoConfig, HashAlgorithm, KeyMaterial, KeyRole};
use ebics_crypto::{public_key_components, public_key_digest, KeyManager};

/// Key role on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Encryption key.
    E,
    /// Authorization (signing) key.
    X,
}

impl From<RoleArg> for KeyRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::E => KeyRole::Encryption,
            RoleArg::X => KeyRole::Authorization,
        }
    }
}

/// Arguments for `ebics keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Which key to generate.
    #[arg(long, value_enum)]
    pub role: RoleArg,
    /// Output directory for the PEM files.
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,
    /// Filename prefix (default: `ebics-e` or `ebics-x`).
    #[arg(long)]
    pub prefix: Option<String>,
    /// Modulus size in bits (default from configuration).
    #[arg(long)]
    pub bits: Option<usize>,
    /// PRF hash for passphrase protection (default from configuration).
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,
    /// Environment variable holding the private-key passphrase.
    #[arg(long, value_name = "VAR")]
    pub passphrase_env: Option<String>,
}

/// Arguments for `ebics fingerprint`.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Hash algorithm.
    #[arg(long, default_value = "sha256")]
    pub hash: HashAlgorithm,
}

/// Arguments for `ebics components`.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
}

/// Execute `ebics keygen`.
pub fn run_keygen(args: &KeygenArgs, config: &CryptoConfig) -> Result<u8> {
    let role = KeyRole::from(args.role);
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| format!("ebics-{}", role.letter().to_ascii_lowercase()));
    let passphrase = crate::passphrase_from_env(args.passphrase_env.as_deref())?;
    let bits = args.bits.unwrap_or(config.keygen.bits);
    let hash = args.hash.unwrap_or(config.keygen.hash);

    let manager = KeyManager::new(config.keygen.clone());
    let material = manager
        .generate_key_pair(passphrase.as_ref(), hash, bits)
        .with_context(|| format!("failed to generate {role} key pair"))?;

    write_key_pair(&args.out, &prefix, &material)?;
    let fingerprint = public_key_digest(&material, HashAlgorithm::Sha256)?;

    println!("OK: generated {role} key pair ({bits} bits)");
    println!("  Private key: {}", args.out.join(format!("{prefix}.key.pem")).display());
    println!("  Public key:  {}", args.out.join(format!("{prefix}.pub.pem")).display());
    println!("  Protected:   {}", material.is_passphrase_protected());
    println!("  Fingerprint (sha256): {}", fingerprint.to_hex());
    Ok(0)
}

fn write_key_pair(dir: &Path, prefix: &str, material: &KeyMaterial) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let public_path = dir.join(format!("{prefix}.pub.pem"));
    std::fs::write(&public_path, material.public_pem())
        .with_context(|| format!("failed to write public key: {}", public_path.display()))?;

    if let Some(private_pem) = material.private_pem() {
        crate::write_private(&dir.join(format!("{prefix}.key.pem")), private_pem.as_bytes())?;
    }
    Ok(())
}

/// Execute `ebics fingerprint`.
pub fn run_fingerprint(args: &FingerprintArgs) -> Result<u8> {
    let material = crate::load_public_key(&args.pubkey)?;
    let digest = public_key_digest(&material, args.hash)
        .with_context(|| format!("cannot fingerprint {}", args.pubkey.display()))?;
    println!("{} hex:    {}", args.hash, digest.to_hex());
    println!("{} base64: {}", args.hash, BASE64.encode(digest.as_bytes()));
    Ok(0)
}

/// Execute `ebics components`.
pub fn run_components(args: &ComponentsArgs) -> Result<u8> {
    let material = crate::load_public_key(&args.pubkey)?;
    let components = public_key_components(&material)
        .with_context(|| format!("cannot read {}", args.pubkey.display()))?;
    println!("exponent: {}", hex::encode(components.exponent()));
    println!("modulus:  {}", hex::encode(components.modulus()));
    Ok(0)
}
