//! Contract interaction helpers

use bach_crypto::to_checksum;
use bach_primitives::Address;
use bytes::Bytes;
use thiserror::Error;

use crate::abi::Abi;
use crate::error::AbiError;
use crate::item::{CustomError, Event, EventParam, Function};
use crate::param::{Param, ParamType};
use crate::revert::RevertReason;
use crate::token::Token;

/// Codec failure with the contract and function it happened for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("contract {}, function \"{}\": {}", to_checksum(.contract), .function, .source)]
pub struct ContractError {
    /// Contract address
    pub contract: Address,
    /// Function name
    pub function: String,
    /// Underlying codec error
    pub source: AbiError,
}

/// Contract helper for encoding/decoding function calls
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Contract interface
    abi: Abi,
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address, abi: Abi) -> Self {
        Self { address, abi }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the contract interface
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.function(name).ok()
    }

    /// Encode a function call
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, ContractError> {
        self.abi
            .encode_function_data(function_name, args)
            .map(Bytes::from)
            .map_err(|e| self.context(function_name, e))
    }

    /// Decode function output
    pub fn decode_output(
        &self,
        function_name: &str,
        data: &[u8],
    ) -> Result<Vec<Token>, ContractError> {
        self.abi
            .decode_function_result(function_name, data)
            .map_err(|e| self.context(function_name, e))
    }

    /// Decode the revert data of a failed call
    pub fn decode_revert(
        &self,
        function_name: &str,
        data: &[u8],
    ) -> Result<RevertReason, ContractError> {
        self.abi
            .decode_error_result(data)
            .map_err(|e| self.context(function_name, e))
    }

    fn context(&self, function: &str, source: AbiError) -> ContractError {
        tracing::debug!(
            contract = %self.address,
            function,
            error = %source,
            "contract codec error"
        );
        ContractError {
            contract: self.address,
            function: function.to_string(),
            source,
        }
    }
}

/// Builder for creating common contract interfaces
pub struct ContractBuilder {
    address: Address,
    abi: Abi,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            address,
            abi: Abi::default(),
        }
    }

    /// Add a function with unnamed parameters
    pub fn function(mut self, name: &str, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        self.abi.functions.push(Function::new(
            name,
            inputs.into_iter().map(Param::unnamed).collect(),
            outputs.into_iter().map(Param::unnamed).collect(),
        ));
        self
    }

    /// Add an event
    pub fn event(mut self, event: Event) -> Self {
        self.abi.events.push(event);
        self
    }

    /// Add a custom error
    pub fn error(mut self, error: CustomError) -> Self {
        self.abi.errors.push(error);
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        Contract {
            address: self.address,
            abi: self.abi,
        }
    }
}

/// Create an ERC20 contract helper
pub fn erc20(address: Address) -> Contract {
    ContractBuilder::new(address)
        .function("name", vec![], vec![ParamType::String])
        .function("symbol", vec![], vec![ParamType::String])
        .function("decimals", vec![], vec![ParamType::Uint(8)])
        .function("totalSupply", vec![], vec![ParamType::Uint(256)])
        .function("balanceOf", vec![ParamType::Address], vec![ParamType::Uint(256)])
        .function(
            "transfer",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .function(
            "approve",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .function(
            "allowance",
            vec![ParamType::Address, ParamType::Address],
            vec![ParamType::Uint(256)],
        )
        .function(
            "transferFrom",
            vec![ParamType::Address, ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .event(Event::new(
            "Transfer",
            vec![
                EventParam::new("from", ParamType::Address, true),
                EventParam::new("to", ParamType::Address, true),
                EventParam::new("value", ParamType::Uint(256), false),
            ],
        ))
        .event(Event::new(
            "Approval",
            vec![
                EventParam::new("owner", ParamType::Address, true),
                EventParam::new("spender", ParamType::Address, true),
                EventParam::new("value", ParamType::Uint(256), false),
            ],
        ))
        .build()
}
