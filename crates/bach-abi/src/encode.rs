//! ABI encoding

use bach_primitives::U256;

use crate::error::{AbiError, Result};
use crate::param::{Param, ParamType};
use crate::token::Token;
use crate::WORD_SIZE;

/// One parameter encoded on its own, before head/tail assembly
#[derive(Debug)]
struct Segment {
    dynamic: bool,
    bytes: Vec<u8>,
}

/// Encode tokens with the standard head/tail ABI layout.
///
/// Returns an empty buffer for an empty parameter list.
pub fn encode<P: AsRef<ParamType>>(params: &[P], tokens: &[Token]) -> Result<Vec<u8>> {
    if params.len() != tokens.len() {
        return Err(AbiError::LengthMismatch {
            expected: params.len(),
            given: tokens.len(),
        });
    }
    tracing::trace!(params = params.len(), "encoding ABI parameters");

    let segments = params
        .iter()
        .zip(tokens)
        .map(|(param, token)| prepare(param.as_ref(), token))
        .collect::<Result<Vec<_>>>()?;
    Ok(assemble(segments))
}

/// Encode function call (selector + params)
pub fn encode_function_call<P: AsRef<ParamType>>(
    selector: [u8; 4],
    params: &[P],
    tokens: &[Token],
) -> Result<Vec<u8>> {
    let mut result = selector.to_vec();
    result.extend(encode(params, tokens)?);
    Ok(result)
}

/// Lay segments out as head followed by tail.
///
/// Static segments go inline in the head; each dynamic segment leaves an
/// offset (relative to the head start) and is appended to the tail.
fn assemble(segments: Vec<Segment>) -> Vec<u8> {
    let head_size: usize = segments
        .iter()
        .map(|s| if s.dynamic { WORD_SIZE } else { s.bytes.len() })
        .sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for segment in segments {
        if segment.dynamic {
            head.extend_from_slice(&usize_word(head_size + tail.len()));
            tail.extend(segment.bytes);
        } else {
            head.extend(segment.bytes);
        }
    }

    head.extend(tail);
    head
}

fn prepare(kind: &ParamType, token: &Token) -> Result<Segment> {
    match (kind, token) {
        (ParamType::Address, Token::Address(addr)) => Ok(fixed(addr.to_word())),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(out_of_range(kind, value));
            }
            Ok(fixed(u256_word(value)))
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits_bits(*bits) {
                return Err(out_of_range(kind, value));
            }
            Ok(fixed(u256_word(&value.to_twos_complement())))
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut word = [0u8; WORD_SIZE];
            word[WORD_SIZE - 1] = u8::from(*b);
            Ok(fixed(word))
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
            let mut word = [0u8; WORD_SIZE];
            word[..data.len()].copy_from_slice(data);
            Ok(fixed(word))
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(dynamic(payload(data))),
        (ParamType::String, Token::String(s)) => Ok(dynamic(payload(s.as_bytes()))),
        (ParamType::Array(inner), Token::Array(items) | Token::FixedArray(items)) => {
            let segments = prepare_all(std::iter::repeat(&**inner), items)?;
            let mut bytes = usize_word(items.len()).to_vec();
            bytes.extend(assemble(segments));
            Ok(dynamic(bytes))
        }
        (ParamType::FixedArray(inner, len), Token::Array(items) | Token::FixedArray(items)) => {
            if items.len() != *len {
                return Err(AbiError::ArrayLengthMismatch {
                    ty: kind.to_string(),
                    expected: *len,
                    given: items.len(),
                });
            }
            let segments = prepare_all(std::iter::repeat(&**inner), items)?;
            Ok(composite(kind, segments))
        }
        (ParamType::Tuple(components), Token::Tuple(items)) => {
            if items.len() != components.len() {
                return Err(AbiError::TupleLengthMismatch {
                    ty: kind.to_string(),
                    expected: components.len(),
                    given: items.len(),
                });
            }
            let segments = prepare_all(components.iter().map(|c| &c.kind), items)?;
            Ok(composite(kind, segments))
        }
        (ParamType::Tuple(components), Token::Struct(fields)) => {
            let items = components
                .iter()
                .map(|c| struct_field(kind, c, fields))
                .collect::<Result<Vec<_>>>()?;
            // every component is present; anything beyond that is an extra or repeated entry
            if fields.len() != components.len() {
                return Err(AbiError::TupleLengthMismatch {
                    ty: kind.to_string(),
                    expected: components.len(),
                    given: fields.len(),
                });
            }
            let segments = components
                .iter()
                .zip(items)
                .map(|(c, item)| prepare(&c.kind, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(composite(kind, segments))
        }
        _ => Err(AbiError::TypeMismatch {
            ty: kind.to_string(),
            value: token.kind_name(),
        }),
    }
}

/// Whether `token` can be encoded as `kind`
pub(crate) fn accepts(kind: &ParamType, token: &Token) -> bool {
    prepare(kind, token).is_ok()
}

fn prepare_all<'a>(
    kinds: impl Iterator<Item = &'a ParamType>,
    tokens: &[Token],
) -> Result<Vec<Segment>> {
    kinds.zip(tokens).map(|(kind, token)| prepare(kind, token)).collect()
}

/// Tuple or fixed array: inline when static, head/tail when dynamic
fn composite(kind: &ParamType, segments: Vec<Segment>) -> Segment {
    Segment {
        dynamic: kind.is_dynamic(),
        bytes: assemble(segments),
    }
}

fn struct_field<'a>(
    kind: &ParamType,
    component: &Param,
    fields: &'a [(String, Token)],
) -> Result<&'a Token> {
    let name = component.name().ok_or_else(|| AbiError::TypeMismatch {
        ty: kind.to_string(),
        value: "struct",
    })?;
    fields
        .iter()
        .find(|(field, _)| field == name)
        .map(|(_, token)| token)
        .ok_or_else(|| AbiError::MissingTupleField {
            ty: kind.to_string(),
            field: name.to_string(),
        })
}

fn fixed(word: [u8; WORD_SIZE]) -> Segment {
    Segment {
        dynamic: false,
        bytes: word.to_vec(),
    }
}

fn dynamic(bytes: Vec<u8>) -> Segment {
    Segment {
        dynamic: true,
        bytes,
    }
}

fn out_of_range(kind: &ParamType, value: &impl std::fmt::Display) -> AbiError {
    AbiError::IntegerOutOfRange {
        ty: kind.to_string(),
        value: value.to_string(),
    }
}

/// Convert U256 to 32-byte big-endian array
pub(crate) fn u256_word(value: &U256) -> [u8; WORD_SIZE] {
    let mut bytes = [0u8; WORD_SIZE];
    value.to_big_endian(&mut bytes);
    bytes
}

pub(crate) fn usize_word(value: usize) -> [u8; WORD_SIZE] {
    u256_word(&U256::from(value))
}

/// Length word followed by the data right-padded to a word boundary
fn payload(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(WORD_SIZE) * WORD_SIZE;
    let mut result = Vec::with_capacity(WORD_SIZE + padded_len);
    result.extend_from_slice(&usize_word(data.len()));
    result.extend_from_slice(data);
    result.resize(WORD_SIZE + padded_len, 0);
    result
}
