//! Non-standard packed encoding (`abi.encodePacked`)

use crate::encode::u256_word;
use crate::error::{AbiError, Result};
use crate::param::ParamType;
use crate::token::Token;
use crate::WORD_SIZE;

/// Encode tokens in packed mode.
///
/// Elementary values take their natural width; array elements are padded to
/// a full word. Tuples have no packed form.
pub fn encode_packed<P: AsRef<ParamType>>(params: &[P], tokens: &[Token]) -> Result<Vec<u8>> {
    if params.len() != tokens.len() {
        return Err(AbiError::LengthMismatch {
            expected: params.len(),
            given: tokens.len(),
        });
    }

    let mut out = Vec::new();
    for (param, token) in params.iter().zip(tokens) {
        pack(param.as_ref(), token, false, &mut out)?;
    }
    Ok(out)
}

fn pack(kind: &ParamType, token: &Token, in_array: bool, out: &mut Vec<u8>) -> Result<()> {
    let start = out.len();
    match (kind, token) {
        (ParamType::Address, Token::Address(addr)) => out.extend_from_slice(addr.as_bytes()),
        (ParamType::Bool, Token::Bool(b)) => out.push(u8::from(*b)),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(out_of_range(kind, value));
            }
            out.extend_from_slice(&u256_word(value)[WORD_SIZE.saturating_sub(bits / 8)..]);
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits_bits(*bits) {
                return Err(out_of_range(kind, value));
            }
            let word = u256_word(&value.to_twos_complement());
            out.extend_from_slice(&word[WORD_SIZE.saturating_sub(bits / 8)..]);
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if *size == 0 || *size > WORD_SIZE {
                return Err(AbiError::InvalidType(kind.to_string()));
            }
            if data.len() != *size {
                return Err(AbiError::BytesSizeMismatch {
                    expected: *size,
                    given: data.len(),
                });
            }
            out.extend_from_slice(data);
        }
        (ParamType::Bytes, Token::Bytes(data)) => out.extend_from_slice(data),
        (ParamType::String, Token::String(s)) => out.extend_from_slice(s.as_bytes()),
        (ParamType::Array(inner), Token::Array(items) | Token::FixedArray(items)) => {
            for item in items {
                pack(inner, item, true, out)?;
            }
        }
        (ParamType::FixedArray(inner, len), Token::Array(items) | Token::FixedArray(items)) => {
            if items.len() != *len {
                return Err(AbiError::ArrayLengthMismatch {
                    ty: kind.to_string(),
                    expected: *len,
                    given: items.len(),
                });
            }
            for item in items {
                pack(inner, item, true, out)?;
            }
        }
        (ParamType::Tuple(_), _) => return Err(AbiError::UnsupportedPackedType(kind.to_string())),
        _ => {
            return Err(AbiError::TypeMismatch {
                ty: kind.to_string(),
                value: token.kind_name(),
            })
        }
    }

    if in_array && !matches!(kind, ParamType::Array(_) | ParamType::FixedArray(..)) {
        let written = out.len() - start;
        if written < WORD_SIZE {
            let padding = WORD_SIZE - written;
            // Elementary types are left-padded, byte strings right-padded
            match kind {
                ParamType::FixedBytes(_) | ParamType::Bytes | ParamType::String => {
                    out.resize(out.len() + padding, 0)
                }
                _ => {
                    out.splice(start..start, std::iter::repeat(0u8).take(padding));
                }
            }
        }
    }
    Ok(())
}

fn out_of_range(kind: &ParamType, value: &impl std::fmt::Display) -> AbiError {
    AbiError::IntegerOutOfRange {
        ty: kind.to_string(),
        value: value.to_string(),
    }
}
