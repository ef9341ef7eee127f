//! # bach-primitives
//!
//! Primitive value types shared by the BachLedger ABI and client crates.
//!
//! - [`Address`]: 20-byte account address
//! - [`H256`]: 32-byte hash / event topic
//! - [`U256`]: unsigned 256-bit integer (from `primitive-types`)
//! - [`I256`]: signed 256-bit integer with two's-complement conversion

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;
mod int;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};
pub use int::I256;

// Re-export primitive-types for U256
pub use primitive_types::U256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_word_layout() {
        let mut word = [0u8; 32];
        U256::from(420u64).to_big_endian(&mut word);
        assert_eq!(&word[30..], &[0x01, 0xa4]);
        assert_eq!(U256::from_big_endian(&word), U256::from(420u64));
    }
}
