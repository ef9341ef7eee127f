//! ABI type descriptors

use std::fmt;

use crate::error::{AbiError, Result};
use crate::WORD_SIZE;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple (struct), components in declaration order
    Tuple(Vec<Param>),
}

/// A named or unnamed parameter: one node of a type descriptor tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    /// Parameter name, `None` when the ABI leaves it empty
    pub name: Option<String>,
    /// Parameter type
    pub kind: ParamType,
}

impl Param {
    /// Create a named parameter. An empty name is treated as no name.
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
            kind,
        }
    }

    /// Create an unnamed parameter
    pub fn unnamed(kind: ParamType) -> Self {
        Self { name: None, kind }
    }

    /// Parameter name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<ParamType> for Param {
    fn from(kind: ParamType) -> Self {
        Param::unnamed(kind)
    }
}

impl AsRef<ParamType> for Param {
    fn as_ref(&self) -> &ParamType {
        &self.kind
    }
}

impl AsRef<ParamType> for ParamType {
    fn as_ref(&self) -> &ParamType {
        self
    }
}

/// Split a trailing array suffix off a type string.
///
/// `"uint8[3]"` gives `(Some(3), "uint8")`, `"string[]"` gives
/// `(None, "string")`. Only the outermost (last) suffix is removed, so
/// `"uint8[2][]"` gives `(None, "uint8[2]")`.
pub fn parse_array_shape(ty: &str) -> Option<(Option<usize>, &str)> {
    let body = ty.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let (element, len) = (&body[..open], &body[open + 1..]);
    if len.is_empty() {
        return Some((None, element));
    }
    if !len.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    len.parse().ok().map(|n| (Some(n), element))
}

impl ParamType {
    /// Parse a type string such as `uint256`, `bytes32[]` or `(address,string)[2]`.
    ///
    /// Tuples are written in their canonical parenthesised form; the bare
    /// `tuple` keyword needs components and goes through
    /// [`ParamType::parse_with_components`].
    pub fn parse(ty: &str) -> Result<Self> {
        parse_kind(ty.trim()).ok_or_else(|| AbiError::InvalidType(ty.to_string()))
    }

    /// Parse a JSON ABI type string whose base may be `tuple`
    pub fn parse_with_components(ty: &str, components: Vec<Param>) -> Result<Self> {
        let ty = ty.trim();
        if let Some((len, element)) = parse_array_shape(ty) {
            let inner = Box::new(Self::parse_with_components(element, components)?);
            return Ok(match len {
                Some(n) => ParamType::FixedArray(inner, n),
                None => ParamType::Array(inner),
            });
        }
        if ty == "tuple" {
            return Ok(ParamType::Tuple(components));
        }
        Self::parse(ty)
    }

    /// Check if this type is dynamic (has a dynamically sized descendant).
    ///
    /// Dynamic values are referenced by an offset from their parent's head;
    /// static values are stored inline.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of its enclosing region
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            ParamType::FixedArray(inner, len) => inner.head_size().saturating_mul(*len),
            ParamType::Tuple(components) => components
                .iter()
                .fold(0usize, |acc, c| acc.saturating_add(c.kind.head_size())),
            _ => WORD_SIZE,
        }
    }

    /// Canonical type string as used in signatures
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::String => f.write_str("string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            ParamType::Tuple(components) => {
                f.write_str("(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", c.kind)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn parse_kind(ty: &str) -> Option<ParamType> {
    if let Some((len, element)) = parse_array_shape(ty) {
        let inner = Box::new(parse_kind(element)?);
        return Some(match len {
            Some(n) => ParamType::FixedArray(inner, n),
            None => ParamType::Array(inner),
        });
    }

    if let Some(body) = ty.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let components = split_components(body)?
            .into_iter()
            .map(|c| parse_kind(c.trim()).map(Param::unnamed))
            .collect::<Option<Vec<_>>>()?;
        return Some(ParamType::Tuple(components));
    }

    match ty {
        "address" => return Some(ParamType::Address),
        "bool" => return Some(ParamType::Bool),
        "string" => return Some(ParamType::String),
        "bytes" => return Some(ParamType::Bytes),
        "uint" => return Some(ParamType::Uint(256)),
        "int" => return Some(ParamType::Int(256)),
        _ => {}
    }

    if let Some(rest) = ty.strip_prefix("uint") {
        return parse_size(rest)
            .filter(|b| b % 8 == 0 && (8..=256).contains(b))
            .map(ParamType::Uint);
    }
    if let Some(rest) = ty.strip_prefix("int") {
        return parse_size(rest).filter(|b| b % 8 == 0 && (8..=256).contains(b)).map(ParamType::Int);
    }
    if let Some(rest) = ty.strip_prefix("bytes") {
        return parse_size(rest).filter(|n| (1..=32).contains(n)).map(ParamType::FixedBytes);
    }
    None
}

/// Decimal size suffix without sign or leading zeros
fn parse_size(s: &str) -> Option<usize> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Split tuple body on top-level commas
fn split_components(body: &str) -> Option<Vec<&str>> {
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    Some(parts)
}
