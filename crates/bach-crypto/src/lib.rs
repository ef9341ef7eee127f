//! # bach-crypto
//!
//! Hashing helpers for BachLedger ABI handling.
//!
//! - Keccak-256 hashing (selectors, event topics)
//! - EIP-55 address checksums

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod error;
mod hash;

pub use checksum::{is_valid_address, parse_address, to_checksum};
pub use error::CryptoError;
pub use hash::keccak256;
