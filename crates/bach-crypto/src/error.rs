//! Cryptographic errors

use thiserror::Error;

/// Cryptographic helper error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Not a `0x`-prefixed 40-digit hex address
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Mixed-case address whose casing does not match EIP-55
    #[error("address checksum mismatch, expected {expected}")]
    ChecksumMismatch {
        /// Correctly checksummed form
        expected: String,
    },
}
