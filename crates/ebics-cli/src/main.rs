//! # ebics CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads
//! the optional configuration file, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ebics_cli::keys::{
    run_components, run_fingerprint, run_keygen, ComponentsArgs, FingerprintArgs, KeygenArgs,
};
use ebics_cli::nonce::{run_nonce, NonceArgs};
use ebics_cli::order::{run_decrypt, run_encrypt, DecryptArgs, EncryptArgs};
use ebics_cli::signing::{run_sign, run_verify, SignArgs, VerifyArgs};
use ebics_core::CryptoConfig;

/// EBICS crypto core CLI.
///
/// Generates subscriber keys, computes INI/HIA key fingerprints, signs
/// request digests, and encrypts or decrypts order data.
#[derive(Parser, Debug)]
#[command(name = "ebics", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML or JSON configuration file.
    #[arg(long, global = true, env = "EBICS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an encryption (E) or authorization (X) key pair.
    Keygen(KeygenArgs),

    /// Print the canonical fingerprint of a public key.
    Fingerprint(FingerprintArgs),

    /// Print the exponent and modulus of a public key.
    Components(ComponentsArgs),

    /// Print fresh request nonces.
    Nonce(NonceArgs),

    /// Sign a request digest with the authorization key.
    Sign(SignArgs),

    /// Verify an authorization signature.
    Verify(VerifyArgs),

    /// Encrypt order data for a recipient's encryption key.
    Encrypt(EncryptArgs),

    /// Decrypt order data with the encryption key.
    Decrypt(DecryptArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ebics CLI starting");

    let config = match &cli.config {
        Some(path) => match CryptoConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to load configuration: {e}");
                return ExitCode::from(2);
            }
        },
        None => CryptoConfig::default(),
    };

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args, &config),
        Commands::Fingerprint(args) => run_fingerprint(args),
        Commands::Components(args) => run_components(args),
        Commands::Nonce(args) => run_nonce(args),
        Commands::Sign(args) => run_sign(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Encrypt(args) => run_encrypt(args),
        Commands::Decrypt(args) => run_decrypt(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
