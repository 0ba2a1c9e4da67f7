//! # ebics-core: Foundational Types for the EBICS Crypto Core
//!
//! This crate defines the value types every cryptographic operation in the
//! workspace consumes or produces. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Raw digests only.** [`DigestBytes`] carries binary digest bytes and
//!    the [`HashAlgorithm`] that produced them. Text encodings are the
//!    request builder's concern.
//!
//! 2. **Key material is opaque.** [`KeyMaterial`] holds PEM text. The only
//!    way to a usable private key is [`KeyMaterial::unlock`], whose result is
//!    zeroized when the calling operation drops it.
//!
//! 3. **Role-scoped lookup.** [`KeyRing`] keeps the encryption and
//!    authorization slots apart and reports an empty slot with a
//!    role-specific error.
//!
//! 4. **One error enum.** Every operation reports exactly one
//!    [`CryptoError`] variant; none carry secrets in their message.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Secret-bearing types never implement `Serialize` and redact `Debug`.

pub mod config;
pub mod digest;
pub mod error;
pub mod keys;
pub mod order_data;

// Re-export primary types for ergonomic imports.
pub use config::{CryptoConfig, DecryptConfig, KeyGenConfig};
pub use digest::{hash, hash_by_name, DigestBytes, HashAlgorithm};
pub use error::{ConfigError, CryptoError};
pub use keys::{KeyMaterial, KeyRing, KeyRole, Passphrase, PublicKeyComponents};
pub use order_data::{EncryptedOrderData, PlaintextOrderData, AES_BLOCK_LEN};
