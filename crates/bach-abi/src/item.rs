//! Functions, events, errors and constructors

use bach_crypto::keccak256;
use bach_primitives::H256;
use serde::{Deserialize, Serialize};

use crate::decode::decode;
use crate::encode::{accepts, encode, encode_function_call};
use crate::error::{AbiError, Result};
use crate::param::{Param, ParamType};
use crate::token::Token;

/// Compute function selector from signature
///
/// e.g., "transfer(address,uint256)" -> [0xa9, 0x05, 0x9c, 0xbb]
pub fn function_selector(signature: &str) -> [u8; 4] {
    keccak256(signature.as_bytes()).prefix()
}

/// Compute event topic from signature
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}

fn signature<'a>(name: &str, kinds: impl Iterator<Item = &'a ParamType>) -> String {
    let types: Vec<String> = kinds.map(ParamType::canonical).collect();
    format!("{}({})", name, types.join(","))
}

/// Split call data into its selector and argument data
pub(crate) fn split_selector(data: &[u8]) -> Result<([u8; 4], &[u8])> {
    if data.len() < 4 {
        return Err(AbiError::ZeroData);
    }
    let (selector, rest) = data.split_at(4);
    let mut out = [0u8; 4];
    out.copy_from_slice(selector);
    Ok((out, rest))
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing from state
    Pure,
    /// Reads state
    View,
    /// Writes state, rejects value
    #[default]
    NonPayable,
    /// Accepts value
    Payable,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Create a new non-payable function
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::default(),
        }
    }

    /// Set the state mutability
    pub fn with_mutability(mut self, state_mutability: StateMutability) -> Self {
        self.state_mutability = state_mutability;
        self
    }

    /// Canonical signature (e.g., "transfer(address,uint256)")
    pub fn signature(&self) -> String {
        signature(&self.name, self.inputs.iter().map(|p| &p.kind))
    }

    /// Function selector (4 bytes)
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Whether `args` match the inputs in count and kind
    pub fn accepts(&self, args: &[Token]) -> bool {
        self.inputs.len() == args.len()
            && self.inputs.iter().zip(args).all(|(p, arg)| accepts(&p.kind, arg))
    }

    /// Encode call data: selector followed by the encoded arguments
    pub fn encode_input(&self, args: &[Token]) -> Result<Vec<u8>> {
        encode_function_call(self.selector(), &self.inputs, args)
    }

    /// Decode call data produced by [`Function::encode_input`]
    pub fn decode_input(&self, data: &[u8]) -> Result<Vec<Token>> {
        let (selector, args) = split_selector(data)?;
        if selector != self.selector() {
            return Err(AbiError::FunctionSignatureNotFound(hex::encode(selector)));
        }
        decode(&self.inputs, args)
    }

    /// Encode return data
    pub fn encode_output(&self, values: &[Token]) -> Result<Vec<u8>> {
        encode(&self.outputs, values)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        decode(&self.outputs, data)
    }
}

/// Event input parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    /// Parameter
    pub param: Param,
    /// Whether the value is carried in a topic instead of the data
    pub indexed: bool,
}

impl EventParam {
    /// Create an event parameter
    pub fn new(name: impl Into<String>, kind: ParamType, indexed: bool) -> Self {
        Self {
            param: Param::new(name, kind),
            indexed,
        }
    }
}

impl AsRef<ParamType> for EventParam {
    fn as_ref(&self) -> &ParamType {
        &self.param.kind
    }
}

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Input parameters, indexed and not
    pub inputs: Vec<EventParam>,
    /// Anonymous events carry no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Create a non-anonymous event
    pub fn new(name: impl Into<String>, inputs: Vec<EventParam>) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous: false,
        }
    }

    /// Canonical signature (e.g., "Transfer(address,address,uint256)")
    pub fn signature(&self) -> String {
        signature(&self.name, self.inputs.iter().map(|p| &p.param.kind))
    }

    /// Signature topic (topic0 of non-anonymous logs)
    pub fn topic(&self) -> H256 {
        event_topic(&self.signature())
    }
}

/// Custom error definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    /// Error name
    pub name: String,
    /// Error parameters
    pub inputs: Vec<Param>,
}

impl CustomError {
    /// Create a custom error
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Canonical signature
    pub fn signature(&self) -> String {
        signature(&self.name, self.inputs.iter().map(|p| &p.kind))
    }

    /// Error selector (4 bytes)
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Encode revert data: selector followed by the encoded arguments
    pub fn encode(&self, args: &[Token]) -> Result<Vec<u8>> {
        encode_function_call(self.selector(), &self.inputs, args)
    }

    /// Decode revert data produced by [`CustomError::encode`]
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Token>> {
        let (selector, args) = split_selector(data)?;
        if selector != self.selector() {
            return Err(AbiError::ErrorSignatureNotFound(hex::encode(selector)));
        }
        decode(&self.inputs, args)
    }
}

/// Constructor definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constructor {
    /// Constructor parameters
    pub inputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Create a constructor
    pub fn new(inputs: Vec<Param>) -> Self {
        Self {
            inputs,
            state_mutability: StateMutability::default(),
        }
    }

    /// Deploy data: creation bytecode followed by the encoded arguments
    pub fn encode_deploy_data(&self, bytecode: &[u8], args: &[Token]) -> Result<Vec<u8>> {
        let mut data = bytecode.to_vec();
        data.extend(encode(&self.inputs, args)?);
        Ok(data)
    }

    /// Recover constructor arguments from deploy data
    pub fn decode_deploy_data(&self, bytecode: &[u8], data: &[u8]) -> Result<Vec<Token>> {
        let args = data
            .strip_prefix(bytecode)
            .ok_or(AbiError::BytecodeMismatch)?;
        decode(&self.inputs, args)
    }
}
