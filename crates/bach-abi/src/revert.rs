//! Revert data decoding
//!
//! Reverts carry either one of the two built-in Solidity errors,
//! `Error(string)` and `Panic(uint256)`, or a custom error declared in the
//! contract ABI.

use std::fmt;

use bach_primitives::U256;

use crate::decode::decode;
use crate::error::{AbiError, Result};
use crate::item::{split_selector, CustomError};
use crate::param::ParamType;
use crate::token::Token;

/// Selector of `Error(string)`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Decoded revert reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `require(false, "...")` or `revert("...")`
    Error(String),
    /// Compiler-inserted check failure
    Panic {
        /// Panic code
        code: U256,
        /// Description of the code, if known
        reason: Option<&'static str>,
    },
    /// Custom error from the contract ABI
    Custom {
        /// Error name
        name: String,
        /// Error arguments
        args: Vec<Token>,
    },
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::Error(message) => write!(f, "reverted: {}", message),
            RevertReason::Panic { code, reason: Some(reason) } => {
                write!(f, "panic 0x{:x}: {}", code, reason)
            }
            RevertReason::Panic { code, reason: None } => write!(f, "panic 0x{:x}", code),
            RevertReason::Custom { name, args } => write!(f, "{}({} args)", name, args.len()),
        }
    }
}

/// Describe a Solidity panic code
pub fn panic_reason(code: &U256) -> Option<&'static str> {
    if code.bits() > 8 {
        return None;
    }
    let reason = match code.low_u32() {
        0x00 => "generic compiler panic",
        0x01 => "assert condition failed",
        0x11 => "arithmetic operation resulted in underflow or overflow",
        0x12 => "division or modulo by zero",
        0x21 => "attempted to convert to an invalid enum value",
        0x22 => "accessed a storage byte array that is incorrectly encoded",
        0x31 => "called pop() on an empty array",
        0x32 => "array index is out of bounds",
        0x41 => "allocated too much memory or created an array which is too large",
        0x51 => "called a zero-initialized variable of internal function type",
        _ => return None,
    };
    Some(reason)
}

/// Decode revert data against the built-in errors and `errors`
pub fn decode_revert(data: &[u8], errors: &[CustomError]) -> Result<RevertReason> {
    let (selector, args) = split_selector(data)?;

    if selector == ERROR_SELECTOR {
        let mut tokens = decode(&[ParamType::String], args)?;
        return match tokens.pop() {
            Some(Token::String(message)) => Ok(RevertReason::Error(message)),
            _ => Err(AbiError::ZeroData),
        };
    }

    if selector == PANIC_SELECTOR {
        let mut tokens = decode(&[ParamType::Uint(256)], args)?;
        return match tokens.pop() {
            Some(Token::Uint(code)) => Ok(RevertReason::Panic {
                reason: panic_reason(&code),
                code,
            }),
            _ => Err(AbiError::ZeroData),
        };
    }

    let error = errors
        .iter()
        .find(|e| e.selector() == selector)
        .ok_or_else(|| AbiError::ErrorSignatureNotFound(hex::encode(selector)))?;
    Ok(RevertReason::Custom {
        name: error.name.clone(),
        args: decode(&error.inputs, args)?,
    })
}
