//! ABI decoding

use bach_primitives::{Address, I256, U256};

use crate::config::DecodeConfig;
use crate::cursor::Cursor;
use crate::error::{AbiError, Result};
use crate::param::{Param, ParamType};
use crate::token::Token;
use crate::WORD_SIZE;

/// Decode tokens from ABI-encoded data with the default (strict) configuration
pub fn decode<P: AsRef<ParamType>>(params: &[P], data: &[u8]) -> Result<Vec<Token>> {
    decode_with(params, data, &DecodeConfig::default())
}

/// Decode tokens from ABI-encoded data.
///
/// The buffer shape is validated before any parameter is read: an empty
/// buffer fails with [`AbiError::ZeroData`] when parameters are expected, and
/// a size that is not a multiple of 32 fails with [`AbiError::DataSizeInvalid`].
pub fn decode_with<P: AsRef<ParamType>>(
    params: &[P],
    data: &[u8],
    config: &DecodeConfig,
) -> Result<Vec<Token>> {
    if data.is_empty() {
        if params.is_empty() {
            return Ok(Vec::new());
        }
        return Err(AbiError::ZeroData);
    }
    if data.len() % WORD_SIZE != 0 {
        return Err(AbiError::DataSizeInvalid { size: data.len() });
    }

    let head_size = params
        .iter()
        .fold(0usize, |acc, p| acc.saturating_add(p.as_ref().head_size()));
    if head_size > data.len() {
        return Err(AbiError::DataSizeTooSmall { size: data.len() });
    }
    tracing::trace!(params = params.len(), size = data.len(), "decoding ABI data");

    let mut decoder = Decoder {
        cursor: Cursor::new(data),
        config,
    };
    params
        .iter()
        .map(|param| decoder.decode_param(param.as_ref(), 0))
        .collect()
}

struct Decoder<'a> {
    cursor: Cursor<'a>,
    config: &'a DecodeConfig,
}

impl Decoder<'_> {
    /// Decode one value at the cursor.
    ///
    /// `base` is the start of the enclosing head region; offsets read for
    /// dynamic values are relative to it.
    fn decode_param(&mut self, kind: &ParamType, base: usize) -> Result<Token> {
        match kind {
            ParamType::Address => Ok(Token::Address(Address::from_word(
                &self.cursor.read_word()?,
            ))),
            ParamType::Uint(_) => Ok(Token::Uint(self.cursor.read_u256()?)),
            ParamType::Int(_) => Ok(Token::Int(I256::from_twos_complement(
                self.cursor.read_u256()?,
            ))),
            ParamType::Bool => self.decode_bool(),
            ParamType::FixedBytes(size) => {
                let word = self.cursor.read_word()?;
                let bytes = word
                    .get(..*size)
                    .ok_or_else(|| AbiError::InvalidType(kind.to_string()))?;
                Ok(Token::FixedBytes(bytes.to_vec()))
            }
            ParamType::Bytes => Ok(Token::Bytes(self.decode_payload(base)?.to_vec())),
            ParamType::String => {
                let bytes = self.decode_payload(base)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| AbiError::InvalidUtf8(e.to_string()))?;
                Ok(Token::String(s.to_string()))
            }
            ParamType::Array(inner) => {
                let resume = self.enter(base)?;
                let count = self.cursor.read_usize()?;
                self.check_count(inner, count)?;
                let start = self.cursor.position();
                let items = self.decode_sequence(std::iter::repeat(&**inner).take(count), start)?;
                self.cursor.restore(resume);
                Ok(Token::Array(items))
            }
            ParamType::FixedArray(inner, len) => {
                let kinds = std::iter::repeat(&**inner).take(*len);
                let items = self.decode_composite(kind, base, kinds)?;
                Ok(Token::FixedArray(items))
            }
            ParamType::Tuple(components) => {
                let items = self.decode_composite(kind, base, components.iter().map(|c| &c.kind))?;
                Ok(tuple_token(components, items))
            }
        }
    }

    fn decode_bool(&mut self) -> Result<Token> {
        let word = self.cursor.read_word()?;
        let value = U256::from_big_endian(&word);
        if value.is_zero() {
            Ok(Token::Bool(false))
        } else if value == U256::one() || !self.config.strict_bool {
            Ok(Token::Bool(true))
        } else {
            Err(AbiError::InvalidBool(hex::encode(word)))
        }
    }

    /// Length-prefixed bytes behind an offset; trailing padding is skipped
    fn decode_payload(&mut self, base: usize) -> Result<&[u8]> {
        let resume = self.enter(base)?;
        let len = self.cursor.read_usize()?;
        let bytes = self.cursor.read_bytes(len)?;
        self.cursor.restore(resume);
        Ok(bytes)
    }

    /// Tuple or fixed array: follows an offset only when the type is dynamic
    fn decode_composite<'k>(
        &mut self,
        kind: &ParamType,
        base: usize,
        kinds: impl Iterator<Item = &'k ParamType>,
    ) -> Result<Vec<Token>> {
        if !kind.is_dynamic() {
            return self.decode_sequence(kinds, base);
        }
        let resume = self.enter(base)?;
        let start = self.cursor.position();
        let items = self.decode_sequence(kinds, start)?;
        self.cursor.restore(resume);
        Ok(items)
    }

    fn decode_sequence<'k>(
        &mut self,
        kinds: impl Iterator<Item = &'k ParamType>,
        base: usize,
    ) -> Result<Vec<Token>> {
        kinds.map(|kind| self.decode_param(kind, base)).collect()
    }

    /// Read an offset word and jump to `base + offset`.
    ///
    /// Returns the position just past the offset slot, to be restored once
    /// the dynamic value has been read.
    fn enter(&mut self, base: usize) -> Result<usize> {
        let offset = self.cursor.read_usize()?;
        let resume = self.cursor.position();
        let target = base
            .checked_add(offset)
            .ok_or(AbiError::OffsetOverflow(U256::from(offset)))?;
        self.cursor.seek(target)?;
        Ok(resume)
    }

    /// Reject element counts the remaining buffer cannot hold
    fn check_count(&self, inner: &ParamType, count: usize) -> Result<()> {
        let head = inner.head_size();
        let limit = match head {
            0 => self.cursor.len(),
            head => self.cursor.remaining() / head,
        };
        if count > limit {
            return Err(AbiError::OutOfBounds {
                position: self.cursor.position(),
                len: count.saturating_mul(head),
                size: self.cursor.len(),
            });
        }
        Ok(())
    }
}

/// Named aggregate when every component is named, positional otherwise
fn tuple_token(components: &[Param], items: Vec<Token>) -> Token {
    let named = !components.is_empty() && components.iter().all(|c| c.name.is_some());
    if !named {
        return Token::Tuple(items);
    }
    Token::Struct(
        components
            .iter()
            .zip(items)
            .map(|(c, item)| (c.name.clone().unwrap_or_default(), item))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    fn word(value: u64) -> Vec<u8> {
        crate::encode::usize_word(value as usize).to_vec()
    }

    #[test]
    fn test_decode_uint() {
        let data = word(420);
        let tokens = decode(&[ParamType::Uint(256)], &data).unwrap();
        assert_eq!(tokens, vec![Token::uint(420u64)]);
    }

    #[test]
    fn test_decode_negative_int() {
        let data = vec![0xffu8; 32];
        let tokens = decode(&[ParamType::Int(256)], &data).unwrap();
        assert_eq!(tokens, vec![Token::int(-1i64)]);
    }

    #[test]
    fn test_decode_bool_strictness() {
        let data = word(2);
        assert_eq!(
            decode(&[ParamType::Bool], &data).unwrap_err(),
            AbiError::InvalidBool(hex::encode(&data))
        );
        let tokens = decode_with(&[ParamType::Bool], &data, &DecodeConfig::lenient()).unwrap();
        assert_eq!(tokens, vec![Token::Bool(true)]);
    }

    #[test]
    fn test_decode_string() {
        let data = [word(32), word(2), {
            let mut w = vec![0u8; 32];
            w[..2].copy_from_slice(b"hi");
            w
        }]
        .concat();
        let tokens = decode(&[ParamType::String], &data).unwrap();
        assert_eq!(tokens, vec![Token::string("hi")]);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let data = [word(32), word(1), {
            let mut w = vec![0u8; 32];
            w[0] = 0xff;
            w
        }]
        .concat();
        assert!(matches!(
            decode(&[ParamType::String], &data),
            Err(AbiError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_zero_data() {
        assert_eq!(decode(&[ParamType::Bool], &[]).unwrap_err(), AbiError::ZeroData);
        let params: [ParamType; 0] = [];
        assert_eq!(decode(&params, &[]).unwrap(), Vec::<Token>::new());
    }

    #[test]
    fn test_decode_size_not_word_aligned() {
        let data = vec![0u8; 33];
        assert_eq!(
            decode(&[ParamType::Uint(256)], &data).unwrap_err(),
            AbiError::DataSizeInvalid { size: 33 }
        );
    }

    #[test]
    fn test_decode_head_too_small() {
        let data = word(1);
        assert_eq!(
            decode(&[ParamType::Uint(256), ParamType::Uint(256)], &data).unwrap_err(),
            AbiError::DataSizeTooSmall { size: 32 }
        );
    }

    #[test]
    fn test_decode_offset_out_of_bounds() {
        let data = word(64);
        assert!(matches!(
            decode(&[ParamType::Bytes], &data),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_length_out_of_bounds() {
        let data = [word(32), word(1_000_000)].concat();
        assert!(matches!(
            decode(&[ParamType::Bytes], &data),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_huge_array_count() {
        let ty = ParamType::parse("uint256[]").unwrap();
        let data = [word(32), word(u64::MAX)].concat();
        assert!(decode(&[ty], &data).is_err());
    }

    #[test]
    fn test_decode_restores_cursor_after_dynamic() {
        let params = [ParamType::String, ParamType::Uint(256), ParamType::Bytes];
        let tokens = vec![
            Token::string("first"),
            Token::uint(7u64),
            Token::Bytes(vec![1, 2, 3]),
        ];
        let encoded = encode(&params, &tokens).unwrap();
        assert_eq!(decode(&params, &encoded).unwrap(), tokens);
    }

    #[test]
    fn test_decode_positional_tuple_when_any_name_missing() {
        let ty = ParamType::Tuple(vec![
            Param::new("a", ParamType::Uint(256)),
            Param::unnamed(ParamType::Bool),
        ]);
        let data = [word(3), word(1)].concat();
        let tokens = decode(&[ty], &data).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Tuple(vec![Token::uint(3u64), Token::Bool(true)])]
        );
    }

    #[test]
    fn test_decode_empty_tuple_consumes_nothing() {
        let params = [ParamType::Tuple(vec![]), ParamType::Uint(256)];
        let data = word(9);
        let tokens = decode(&params, &data).unwrap();
        assert_eq!(tokens, vec![Token::Tuple(vec![]), Token::uint(9u64)]);
    }

    #[test]
    fn test_decode_fixed_array_of_strings() {
        let ty = ParamType::parse("string[2]").unwrap();
        let value = Token::FixedArray(vec![Token::string("a"), Token::string("bc")]);
        let encoded = encode(&[ty.clone()], &[value.clone()]).unwrap();
        // offset, then an inner head of two offsets
        assert_eq!(&encoded[..32], &word(32)[..]);
        assert_eq!(&encoded[32..64], &word(64)[..]);
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
    }
}
