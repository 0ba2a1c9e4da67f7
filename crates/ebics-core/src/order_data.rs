//! # Order Data Buffers
//!
//! Value types for order data on either side of the hybrid cipher.
//! Neither type enforces its length invariants at construction: the remote
//! sender controls the bytes, and the decryptor reports violations as
//! `DecryptionFailure`.

/// AES block size in bytes.
pub const AES_BLOCK_LEN: usize = 16;

/// Order data as delivered by the bank: an RSA-wrapped transaction key and
/// the AES-CBC payload it unlocks.
///
/// Expected shape: `transaction_key` is as long as the recipient's modulus,
/// `payload` is a whole number of 16-byte blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedOrderData {
    transaction_key: Vec<u8>,
    payload: Vec<u8>,
}

impl EncryptedOrderData {
    pub fn new(transaction_key: Vec<u8>, payload: Vec<u8>) -> Self {
        Self {
            transaction_key,
            payload,
        }
    }

    /// RSA ciphertext of the one-time AES key.
    pub fn transaction_key(&self) -> &[u8] {
        &self.transaction_key
    }

    /// AES-128-CBC ciphertext of the compressed order data.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether the payload is a whole number of AES blocks.
    pub fn is_block_aligned(&self) -> bool {
        self.payload.len() % AES_BLOCK_LEN == 0
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.transaction_key, self.payload)
    }
}

/// Decompressed order data, handed to an external parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextOrderData(Vec<u8>);

impl PlaintextOrderData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for PlaintextOrderData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PlaintextOrderData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
