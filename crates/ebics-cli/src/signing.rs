//! # Signing Subcommands
//!
//! `sign` and `verify` over a hex-encoded digest. The digest is the one the
//! request builder computed over the canonicalized request; these commands
//! never hash documents themselves.

use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Args;

use ebics_core::{HashAlgorithm, KeyRing};

/// Arguments for `ebics sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Authorization private key PEM file.
    #[arg(long)]
    pub key: PathBuf,
    /// Matching public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Digest to sign, hex-encoded.
    #[arg(long)]
    pub digest: String,
    /// Algorithm that produced the digest.
    #[arg(long, default_value = "sha256")]
    pub hash: HashAlgorithm,
    /// Environment variable holding the private-key passphrase.
    #[arg(long, value_name = "VAR")]
    pub passphrase_env: Option<String>,
}

/// Arguments for `ebics verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signer's public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Signed digest, hex-encoded.
    #[arg(long)]
    pub digest: String,
    /// Signature, base64-encoded.
    #[arg(long)]
    pub signature: String,
    /// Algorithm that produced the digest.
    #[arg(long, default_value = "sha256")]
    pub hash: HashAlgorithm,
}

/// Execute `ebics sign`.
pub fn run_sign(args: &SignArgs) -> Result<u8> {
    println!("{}", sign_to_base64(args)?);
    Ok(0)
}

fn sign_to_base64(args: &SignArgs) -> Result<String> {
    let material = crate::load_key_pair(&args.key, &args.pubkey)?;
    let digest = crate::parse_digest(&args.digest, args.hash)?;
    let mut key_ring = KeyRing::new().with_authorization_key(material);
    if let Some(passphrase) = crate::passphrase_from_env(args.passphrase_env.as_deref())? {
        key_ring = key_ring.with_passphrase(passphrase);
    }

    let signature = ebics_crypto::sign(&key_ring, &digest).context("signing failed")?;
    Ok(BASE64.encode(signature))
}

/// Execute `ebics verify`. Exit code 1 means the signature did not verify.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let material = crate::load_public_key(&args.pubkey)?;
    let digest = crate::parse_digest(&args.digest, args.hash)?;
    let signature = BASE64
        .decode(args.signature.trim())
        .context("signature is not valid base64")?;

    match ebics_crypto::verify(&material, &digest, &signature) {
        Ok(()) => {
            println!("OK: signature is valid");
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}
