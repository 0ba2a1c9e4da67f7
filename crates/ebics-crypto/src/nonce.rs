//! # Nonce Generation
//!
//! Request nonces for replay protection: 16 bytes from the operating
//! system CSPRNG, rendered as 32 uppercase hex characters.
//!
//! Uniqueness is not tracked. With 128 bits of entropy per nonce the
//! collision probability is negligible, and the generator holds no state,
//! so concurrent callers never contend.

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a nonce.
pub const NONCE_LEN: usize = 16;

/// Generate a fresh nonce as 32 uppercase hex characters.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}
