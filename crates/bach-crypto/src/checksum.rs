//! EIP-55 mixed-case address checksums

use bach_primitives::Address;

use crate::{keccak256, CryptoError};

/// Render an address in EIP-55 checksum form
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());
    let hash = hash.as_bytes();

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Check whether `s` is a well-formed address.
///
/// Requires a `0x` prefix and 40 hex digits. All-lower-case input is always
/// accepted; anything else must match its EIP-55 checksum when `strict` is set.
pub fn is_valid_address(s: &str, strict: bool) -> bool {
    parse_address_inner(s, strict).is_ok()
}

/// Parse an address, verifying the EIP-55 checksum of mixed-case input
pub fn parse_address(s: &str) -> Result<Address, CryptoError> {
    parse_address_inner(s, true)
}

fn parse_address_inner(s: &str, strict: bool) -> Result<Address, CryptoError> {
    let digits = s
        .strip_prefix("0x")
        .filter(|d| d.len() == 40 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| CryptoError::InvalidAddress(s.to_string()))?;

    let address =
        Address::from_hex(digits).map_err(|_| CryptoError::InvalidAddress(s.to_string()))?;

    if strict && digits.chars().any(|c| c.is_ascii_uppercase()) {
        let expected = to_checksum(&address);
        if expected != s {
            return Err(CryptoError::ChecksumMismatch { expected });
        }
    }
    Ok(address)
}
