//! Contract ABI description and JSON loading

use bach_primitives::H256;
use serde::Deserialize;

use crate::config::DecodeConfig;
use crate::error::{AbiError, Result};
use crate::item::{
    split_selector, Constructor, CustomError, Event, EventParam, Function, StateMutability,
};
use crate::log::{DecodedLog, RawLog};
use crate::param::{Param, ParamType};
use crate::revert::{decode_revert, RevertReason};
use crate::token::Token;

/// Parameter entry of a JSON ABI
#[derive(Debug, Deserialize)]
struct JsonParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<JsonParam>,
    #[serde(default)]
    indexed: bool,
}

impl JsonParam {
    fn into_param(self) -> Result<Param> {
        let components = self
            .components
            .into_iter()
            .map(JsonParam::into_param)
            .collect::<Result<Vec<_>>>()?;
        let kind = ParamType::parse_with_components(&self.ty, components)?;
        Ok(Param::new(self.name, kind))
    }

    fn into_event_param(self) -> Result<EventParam> {
        let indexed = self.indexed;
        Ok(EventParam {
            param: self.into_param()?,
            indexed,
        })
    }
}

/// Top-level JSON ABI entry, tagged by its `type` field
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonItem {
    Function {
        name: String,
        #[serde(default)]
        inputs: Vec<JsonParam>,
        #[serde(default)]
        outputs: Vec<JsonParam>,
        #[serde(rename = "stateMutability", default)]
        state_mutability: StateMutability,
    },
    Event {
        name: String,
        #[serde(default)]
        inputs: Vec<JsonParam>,
        #[serde(default)]
        anonymous: bool,
    },
    Error {
        name: String,
        #[serde(default)]
        inputs: Vec<JsonParam>,
    },
    Constructor {
        #[serde(default)]
        inputs: Vec<JsonParam>,
        #[serde(rename = "stateMutability", default)]
        state_mutability: StateMutability,
    },
    Fallback {},
    Receive {},
}

fn params(json: Vec<JsonParam>) -> Result<Vec<Param>> {
    json.into_iter().map(JsonParam::into_param).collect()
}

/// Contract interface: the items of a JSON ABI, resolved to parameter types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    /// Constructor, if declared
    pub constructor: Option<Constructor>,
    /// Functions in declaration order
    pub functions: Vec<Function>,
    /// Events in declaration order
    pub events: Vec<Event>,
    /// Custom errors in declaration order
    pub errors: Vec<CustomError>,
}

impl Abi {
    /// Parse a JSON ABI (an array of items, as emitted by solc)
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<JsonItem> = serde_json::from_str(json)?;
        let mut abi = Abi::default();

        for item in items {
            match item {
                JsonItem::Function {
                    name,
                    inputs,
                    outputs,
                    state_mutability,
                } => abi.functions.push(Function {
                    name,
                    inputs: params(inputs)?,
                    outputs: params(outputs)?,
                    state_mutability,
                }),
                JsonItem::Event {
                    name,
                    inputs,
                    anonymous,
                } => abi.events.push(Event {
                    name,
                    inputs: inputs
                        .into_iter()
                        .map(JsonParam::into_event_param)
                        .collect::<Result<Vec<_>>>()?,
                    anonymous,
                }),
                JsonItem::Error { name, inputs } => abi.errors.push(CustomError {
                    name,
                    inputs: params(inputs)?,
                }),
                JsonItem::Constructor {
                    inputs,
                    state_mutability,
                } => {
                    abi.constructor = Some(Constructor {
                        inputs: params(inputs)?,
                        state_mutability,
                    })
                }
                JsonItem::Fallback {} | JsonItem::Receive {} => {}
            }
        }

        tracing::debug!(
            functions = abi.functions.len(),
            events = abi.events.len(),
            errors = abi.errors.len(),
            "loaded JSON ABI"
        );
        Ok(abi)
    }

    /// Get a function by name (the first declared overload)
    pub fn function(&self, name: &str) -> Result<&Function> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::FunctionNotFound(name.to_string()))
    }

    /// Get the overload of `name` whose inputs accept `args`.
    ///
    /// Overloads are tried in declaration order. When none accepts the
    /// arguments the first declaration is returned, so encoding reports why
    /// the arguments do not fit it.
    pub fn function_for_args(&self, name: &str, args: &[Token]) -> Result<&Function> {
        let first = self.function(name)?;
        Ok(self
            .functions
            .iter()
            .filter(|f| f.name == name)
            .find(|f| f.accepts(args))
            .unwrap_or(first))
    }

    /// Get a function by its 4-byte selector
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Result<&Function> {
        self.functions
            .iter()
            .find(|f| f.selector() == selector)
            .ok_or_else(|| AbiError::FunctionSignatureNotFound(hex::encode(selector)))
    }

    /// Get an event by name
    pub fn event(&self, name: &str) -> Result<&Event> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AbiError::EventNotFound(name.to_string()))
    }

    /// Get a non-anonymous event by its signature topic
    pub fn event_by_topic(&self, topic: &H256) -> Result<&Event> {
        self.events
            .iter()
            .find(|e| !e.anonymous && e.topic() == *topic)
            .ok_or_else(|| AbiError::EventSignatureNotFound(topic.to_hex()))
    }

    /// Get a custom error by name
    pub fn error(&self, name: &str) -> Result<&CustomError> {
        self.errors
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AbiError::ErrorNotFound(name.to_string()))
    }

    /// Encode call data for the named function, resolving overloads by `args`
    pub fn encode_function_data(&self, name: &str, args: &[Token]) -> Result<Vec<u8>> {
        self.function_for_args(name, args)?.encode_input(args)
    }

    /// Identify the function called by `data` and decode its arguments
    pub fn decode_function_data(&self, data: &[u8]) -> Result<(&Function, Vec<Token>)> {
        let (selector, _) = split_selector(data)?;
        let function = self.function_by_selector(selector)?;
        Ok((function, function.decode_input(data)?))
    }

    /// Decode the return data of the named function
    pub fn decode_function_result(&self, name: &str, data: &[u8]) -> Result<Vec<Token>> {
        self.function(name)?.decode_output(data)
    }

    /// Deploy data for the contract's creation bytecode.
    ///
    /// Without a declared constructor only an empty argument list is accepted.
    pub fn encode_deploy_data(&self, bytecode: &[u8], args: &[Token]) -> Result<Vec<u8>> {
        match &self.constructor {
            Some(constructor) => constructor.encode_deploy_data(bytecode, args),
            None if args.is_empty() => Ok(bytecode.to_vec()),
            None => Err(AbiError::ConstructorNotFound),
        }
    }

    /// Decode revert data against the built-in and declared errors
    pub fn decode_error_result(&self, data: &[u8]) -> Result<RevertReason> {
        decode_revert(data, &self.errors)
    }

    /// Decode a log, selecting the event by its signature topic
    pub fn decode_event_log(
        &self,
        topics: &[H256],
        data: &[u8],
        config: &DecodeConfig,
    ) -> Result<DecodedLog> {
        let signature = topics.first().ok_or(AbiError::EmptyTopics)?;
        self.event_by_topic(signature)?.decode_log(topics, data, config)
    }

    /// Decode the logs that belong to events of this ABI.
    ///
    /// Logs without a known signature topic are skipped, as are logs of
    /// events not listed in `events` unless it is empty. Logs that fail to
    /// decode are skipped; with `config.strict` off a log whose data alone is
    /// bad is kept with its indexed arguments.
    pub fn decode_logs(
        &self,
        logs: &[RawLog],
        events: &[&str],
        config: &DecodeConfig,
    ) -> Vec<DecodedLog> {
        logs.iter()
            .filter_map(|log| {
                let event = log
                    .topics
                    .first()
                    .and_then(|topic| self.event_by_topic(topic).ok())?;
                if !events.is_empty() && !events.contains(&event.name.as_str()) {
                    return None;
                }
                match event.decode_log(&log.topics, &log.data, config) {
                    Ok(decoded) => Some(decoded),
                    Err(e) => {
                        tracing::debug!(event = %event.name, error = %e, "skipping log");
                        None
                    }
                }
            })
            .collect()
    }
}
