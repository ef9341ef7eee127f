//! ABI values

use bach_primitives::{Address, H256, I256, U256};

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple with positional entries
    Tuple(Vec<Token>),
    /// Tuple whose components are all named, in declaration order
    Struct(Vec<(String, Token)>),
}

impl Token {
    /// Create a uint token
    pub fn uint(value: impl Into<U256>) -> Self {
        Token::Uint(value.into())
    }

    /// Create an int token
    pub fn int(value: impl Into<I256>) -> Self {
        Token::Int(value.into())
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Create a named tuple token
    pub fn structure<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Token)>,
        S: Into<String>,
    {
        Token::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the token kind, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
            Token::Struct(_) => "struct",
        }
    }

    /// Address value, if this is an address token
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Token::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Unsigned value, if this is a uint token
    pub fn as_uint(&self) -> Option<&U256> {
        match self {
            Token::Uint(v) => Some(v),
            _ => None,
        }
    }

    /// Signed value, if this is an int token
    pub fn as_int(&self) -> Option<&I256> {
        match self {
            Token::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Bool value, if this is a bool token
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String value, if this is a string token
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte content of bytes and fixed-bytes tokens
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Token::Bytes(b) | Token::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of array, fixed-array and positional tuple tokens
    pub fn as_slice(&self) -> Option<&[Token]> {
        match self {
            Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Named field of a struct token
    pub fn field(&self, name: &str) -> Option<&Token> {
        match self {
            Token::Struct(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

impl From<U256> for Token {
    fn from(value: U256) -> Self {
        Token::Uint(value)
    }
}

impl From<I256> for Token {
    fn from(value: I256) -> Self {
        Token::Int(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::String(value)
    }
}
