//! # bach-abi
//!
//! Solidity ABI encoding and decoding for BachLedger.
//!
//! ## Features
//!
//! - **Codec**: head/tail parameter encoding with nested tuples and arrays
//! - **Items**: functions, events, custom errors and constructors
//! - **JSON ABI**: load a solc ABI and look items up by name, selector or topic
//! - **Logs and reverts**: build topic filters, decode event logs and revert data
//! - **Contract**: call encoding with contract context on errors
//!
//! ## Quick Start
//!
//! ```rust
//! use bach_abi::{decode, encode, Param, ParamType, Token};
//!
//! // tuple(uint256[] x)
//! let params = [ParamType::Tuple(vec![Param::new(
//!     "x",
//!     ParamType::Array(Box::new(ParamType::Uint(256))),
//! )])];
//! let values = [Token::structure([(
//!     "x",
//!     Token::Array(vec![Token::uint(1u64), Token::uint(2u64)]),
//! )])];
//!
//! let data = encode(&params, &values).unwrap();
//! assert_eq!(data.len(), 5 * 32);
//! assert_eq!(decode(&params, &data).unwrap(), values);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod abi;
mod config;
pub mod contract;
mod cursor;
mod decode;
mod encode;
mod error;
mod item;
mod log;
mod packed;
mod param;
mod revert;
mod token;

/// Size of an ABI word in bytes
pub const WORD_SIZE: usize = 32;

pub use abi::Abi;
pub use config::DecodeConfig;
pub use contract::{erc20, Contract, ContractBuilder, ContractError};
pub use decode::{decode, decode_with};
pub use encode::{encode, encode_function_call};
pub use error::{AbiError, Result};
pub use item::{
    event_topic, function_selector, Constructor, CustomError, Event, EventParam, Function,
    StateMutability,
};
pub use log::{DecodedLog, LogParam, RawLog};
pub use packed::encode_packed;
pub use param::{parse_array_shape, Param, ParamType};
pub use revert::{decode_revert, panic_reason, RevertReason, ERROR_SELECTOR, PANIC_SELECTOR};
pub use token::Token;

pub use bach_primitives::{Address, H256, I256, U256};
