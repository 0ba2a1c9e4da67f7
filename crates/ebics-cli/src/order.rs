//! # Order-Data Subcommands
//!
//! `encrypt` and `decrypt` over raw binary files: the RSA-wrapped
//! transaction key and the AES payload are kept in separate files, exactly
//! as they appear (base64-decoded) in a transfer response.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ebics_core::{CryptoConfig, EncryptedOrderData, KeyRing};
use ebics_crypto::{decrypt_order_data_with, encrypt_order_data};

/// Arguments for `ebics encrypt`.
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Recipient's encryption public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Plaintext order data.
    #[arg(long)]
    pub input: PathBuf,
    /// Output file for the wrapped transaction key.
    #[arg(long)]
    pub out_key: PathBuf,
    /// Output file for the encrypted payload.
    #[arg(long)]
    pub out_payload: PathBuf,
}

/// Arguments for `ebics decrypt`.
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Encryption private key PEM file.
    #[arg(long)]
    pub key: PathBuf,
    /// Matching public key PEM file.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Wrapped transaction key file.
    #[arg(long)]
    pub tx_key: PathBuf,
    /// Encrypted payload file.
    #[arg(long)]
    pub payload: PathBuf,
    /// Output file for the plaintext (default: stdout).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Environment variable holding the private-key passphrase.
    #[arg(long, value_name = "VAR")]
    pub passphrase_env: Option<String>,
}

/// Execute `ebics encrypt`.
pub fn run_encrypt(args: &EncryptArgs) -> Result<u8> {
    let recipient = crate::load_public_key(&args.pubkey)?;
    let plaintext = crate::read_bytes(&args.input, "order data")?;

    let encrypted = encrypt_order_data(&recipient, &plaintext).context("encryption failed")?;
    std::fs::write(&args.out_key, encrypted.transaction_key())
        .with_context(|| format!("failed to write {}", args.out_key.display()))?;
    std::fs::write(&args.out_payload, encrypted.payload())
        .with_context(|| format!("failed to write {}", args.out_payload.display()))?;

    println!(
        "OK: encrypted {} bytes into {} payload bytes",
        plaintext.len(),
        encrypted.payload().len()
    );
    Ok(0)
}

/// Execute `ebics decrypt`.
pub fn run_decrypt(args: &DecryptArgs, config: &CryptoConfig) -> Result<u8> {
    let material = crate::load_key_pair(&args.key, &args.pubkey)?;
    let mut key_ring = KeyRing::new().with_encryption_key(material);
    if let Some(passphrase) = crate::passphrase_from_env(args.passphrase_env.as_deref())? {
        key_ring = key_ring.with_passphrase(passphrase);
    }
    let encrypted = EncryptedOrderData::new(
        crate::read_bytes(&args.tx_key, "transaction key")?,
        crate::read_bytes(&args.payload, "payload")?,
    );

    let plaintext = decrypt_order_data_with(&key_ring, &encrypted, &config.decrypt)
        .context("decryption failed")?;

    match &args.output {
        Some(path) => {
            crate::write_private(path, plaintext.as_bytes())?;
            println!("OK: decrypted {} bytes", plaintext.len());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(plaintext.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write plaintext to stdout")?;
        }
    }
    Ok(0)
}
