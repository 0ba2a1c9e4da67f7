//! # ebics-crypto: Transport Cryptography
//!
//! The cryptographic operations a subscriber performs around EBICS
//! requests and responses:
//!
//! - **Nonces** for request replay protection ([`generate_nonce`]).
//! - **Key management**: RSA key pair generation and the canonical
//!   public-key fingerprint sent in INI/HIA letters ([`KeyManager`],
//!   [`public_key_digest`]).
//! - **Order data**: RSA-wrapped transaction key, AES-128-CBC, zlib
//!   ([`decrypt_order_data`], [`encrypt_order_data`]).
//! - **Signatures**: RSA PKCS#1 v1.5 over a caller-supplied digest
//!   ([`sign`], [`verify`]).
//!
//! ## Crate Policy
//!
//! - Depends only on `ebics-core` internally.
//! - Every operation takes its keys as arguments; nothing here keeps state
//!   between calls, so all functions are safe to call from many threads.
//! - Unlocked private keys live only for the duration of one call.
//! - No mocked cryptography in tests: real RSA keys, real AES, real zlib.

pub mod hybrid;
pub mod keys;
pub mod nonce;
pub mod signature;

pub use hybrid::{
    decrypt_order_data, decrypt_order_data_with, encrypt_order_data, TRANSACTION_KEY_LEN,
};
pub use keys::{
    components_digest, fingerprint_text, public_key_components, public_key_digest, KeyManager,
};
pub use nonce::{generate_nonce, NONCE_LEN};
pub use signature::{digest_info, digest_info_prefix, sign, verify};
