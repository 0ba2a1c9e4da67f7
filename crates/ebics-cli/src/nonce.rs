//! # Nonce Subcommand

use anyhow::{bail, Result};
use clap::Args;

use ebics_crypto::generate_nonce;

/// Arguments for `ebics nonce`.
#[derive(Args, Debug)]
pub struct NonceArgs {
    /// Number of nonces to print, one per line.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
}

/// Execute `ebics nonce`.
pub fn run_nonce(args: &NonceArgs) -> Result<u8> {
    for nonce in nonces(args.count)? {
        println!("{nonce}");
    }
    Ok(0)
}

fn nonces(count: usize) -> Result<Vec<String>> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    Ok((0..count).map(|_| generate_nonce()).collect())
}
