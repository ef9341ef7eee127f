//! Event log decoding

use bach_crypto::keccak256;
use bach_primitives::H256;

use crate::config::DecodeConfig;
use crate::decode::decode_with;
use crate::encode::encode;
use crate::error::{AbiError, Result};
use crate::item::{Event, EventParam};
use crate::param::ParamType;
use crate::token::Token;

/// Log as emitted by a contract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLog {
    /// Topics, signature topic first for non-anonymous events
    pub topics: Vec<H256>,
    /// Non-indexed arguments, ABI-encoded
    pub data: Vec<u8>,
}

impl RawLog {
    /// Create a log from its topics and data
    pub fn new(topics: Vec<H256>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            topics,
            data: data.into(),
        }
    }
}

/// One decoded event argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogParam {
    /// Parameter name, or its position when unnamed
    pub name: String,
    /// Decoded value
    pub value: Token,
    /// Whether the value came from a topic
    pub indexed: bool,
}

/// Decoded event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Event name
    pub event: String,
    /// Arguments in declaration order
    pub params: Vec<LogParam>,
}

impl DecodedLog {
    /// Look up an argument by name
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

impl Event {
    /// Topics selecting logs of this event.
    ///
    /// `args` holds one entry per indexed parameter in declaration order;
    /// `None` matches any value and trailing entries may be left out. Strings
    /// and bytes are matched by their keccak hash. Arrays and tuples have no
    /// topic form and fail with [`AbiError::FilterTypeNotSupported`].
    pub fn encode_topics(&self, args: &[Option<Token>]) -> Result<Vec<Option<H256>>> {
        let indexed: Vec<&EventParam> = self.inputs.iter().filter(|p| p.indexed).collect();
        if args.len() > indexed.len() {
            return Err(AbiError::LengthMismatch {
                expected: indexed.len(),
                given: args.len(),
            });
        }

        let mut topics = Vec::with_capacity(args.len() + 1);
        if !self.anonymous {
            topics.push(Some(self.topic()));
        }
        for (input, arg) in indexed.into_iter().zip(args) {
            let topic = arg
                .as_ref()
                .map(|token| encode_topic(&input.param.kind, token))
                .transpose()?;
            topics.push(topic);
        }
        Ok(topics)
    }

    /// Decode a log emitted by this event.
    ///
    /// Indexed arguments of dynamic type (strings, bytes, arrays and tuples)
    /// are only available as their 32-byte topic hash and are returned as
    /// `bytes32` values. When `config.strict` is off, a data section that does
    /// not decode is skipped and only the indexed arguments are returned.
    pub fn decode_log(
        &self,
        topics: &[H256],
        data: &[u8],
        config: &DecodeConfig,
    ) -> Result<DecodedLog> {
        let arg_topics = if self.anonymous {
            topics
        } else {
            let (signature, rest) = topics.split_first().ok_or(AbiError::EmptyTopics)?;
            if *signature != self.topic() {
                return Err(AbiError::EventSignatureNotFound(signature.to_hex()));
            }
            rest
        };

        let mut values: Vec<Option<Token>> = vec![None; self.inputs.len()];

        if !arg_topics.is_empty() {
            let mut remaining = arg_topics.iter();
            for (i, input) in self.inputs.iter().enumerate().filter(|(_, p)| p.indexed) {
                let topic = remaining.next().ok_or_else(|| AbiError::TopicsMismatch {
                    event: self.signature(),
                    param: param_name(i, input),
                })?;
                values[i] = Some(decode_topic(&input.param.kind, topic, config)?);
            }
        }

        let (data_slots, data_params): (Vec<usize>, Vec<&EventParam>) = self
            .inputs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.indexed)
            .unzip();

        if !data_params.is_empty() {
            match decode_with(&data_params, data, config) {
                Ok(tokens) => {
                    for (slot, token) in data_slots.into_iter().zip(tokens) {
                        values[slot] = Some(token);
                    }
                }
                Err(e) if config.strict => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        event = %self.name,
                        error = %e,
                        "skipping undecodable log data"
                    );
                }
            }
        }

        let params = self
            .inputs
            .iter()
            .enumerate()
            .zip(values)
            .filter_map(|((i, input), value)| {
                value.map(|value| LogParam {
                    name: param_name(i, input),
                    value,
                    indexed: input.indexed,
                })
            })
            .collect();

        Ok(DecodedLog {
            event: self.name.clone(),
            params,
        })
    }
}

fn param_name(index: usize, input: &EventParam) -> String {
    input
        .param
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| index.to_string())
}

fn encode_topic(kind: &ParamType, token: &Token) -> Result<H256> {
    match (kind, token) {
        (ParamType::String, Token::String(s)) => Ok(keccak256(s.as_bytes())),
        (ParamType::Bytes, Token::Bytes(data)) => Ok(keccak256(data)),
        (ParamType::Tuple(_) | ParamType::Array(_) | ParamType::FixedArray(..), _) => {
            Err(AbiError::FilterTypeNotSupported(kind.to_string()))
        }
        _ => {
            let word = encode(&[kind], std::slice::from_ref(token))?;
            H256::from_slice(&word).map_err(|_| AbiError::InvalidType(kind.to_string()))
        }
    }
}

fn decode_topic(kind: &ParamType, topic: &H256, config: &DecodeConfig) -> Result<Token> {
    match kind {
        ParamType::String
        | ParamType::Bytes
        | ParamType::Tuple(_)
        | ParamType::Array(_)
        | ParamType::FixedArray(..) => Ok(Token::bytes32(*topic)),
        _ => {
            let mut tokens = decode_with(&[kind], topic.as_bytes(), config)?;
            tokens.pop().ok_or(AbiError::ZeroData)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bach_primitives::{Address, U256};

    fn transfer_event() -> Event {
        Event::new(
            "Transfer",
            vec![
                EventParam::new("from", ParamType::Address, true),
                EventParam::new("to", ParamType::Address, true),
                EventParam::new("value", ParamType::Uint(256), false),
            ],
        )
    }

    fn address_topic(addr: &Address) -> H256 {
        H256::from_bytes(addr.to_word())
    }

    #[test]
    fn test_decode_transfer_log() {
        let event = transfer_event();
        let from = Address::from_bytes([0x01; 20]);
        let to = Address::from_bytes([0x02; 20]);
        let mut data = [0u8; 32];
        data[31] = 100;

        let log = event
            .decode_log(
                &[event.topic(), address_topic(&from), address_topic(&to)],
                &data,
                &DecodeConfig::default(),
            )
            .unwrap();

        assert_eq!(log.event, "Transfer");
        assert_eq!(log.get("from"), Some(&Token::Address(from)));
        assert_eq!(log.get("to"), Some(&Token::Address(to)));
        assert_eq!(log.get("value"), Some(&Token::Uint(U256::from(100))));
        assert!(log.params[0].indexed);
        assert!(!log.params[2].indexed);
    }

    #[test]
    fn test_empty_topics() {
        let err = transfer_event()
            .decode_log(&[], &[0u8; 32], &DecodeConfig::default())
            .unwrap_err();
        assert_eq!(err, AbiError::EmptyTopics);
    }

    #[test]
    fn test_wrong_signature_topic() {
        let err = transfer_event()
            .decode_log(&[H256::ZERO], &[0u8; 32], &DecodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, AbiError::EventSignatureNotFound(_)));
    }

    #[test]
    fn test_missing_indexed_topic() {
        let event = transfer_event();
        let from = Address::from_bytes([0x01; 20]);
        let err = event
            .decode_log(
                &[event.topic(), address_topic(&from)],
                &[0u8; 32],
                &DecodeConfig::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            AbiError::TopicsMismatch {
                event: "Transfer(address,address,uint256)".to_string(),
                param: "to".to_string()
            }
        );
    }

    #[test]
    fn test_signature_topic_only_skips_indexed() {
        let event = transfer_event();
        let log = event
            .decode_log(&[event.topic()], &[0u8; 32], &DecodeConfig::default())
            .unwrap();
        assert_eq!(log.params.len(), 1);
        assert_eq!(log.params[0].name, "value");
    }

    #[test]
    fn test_indexed_string_yields_hash() {
        let event = Event::new("Named", vec![EventParam::new("label", ParamType::String, true)]);
        let hash = H256::from_bytes([0xab; 32]);
        let log = event
            .decode_log(&[event.topic(), hash], &[], &DecodeConfig::default())
            .unwrap();
        assert_eq!(log.get("label"), Some(&Token::bytes32(hash)));
    }

    #[test]
    fn test_strict_data_mismatch() {
        let event = transfer_event();
        let from = Address::from_bytes([0x01; 20]);
        let to = Address::from_bytes([0x02; 20]);
        let topics = [event.topic(), address_topic(&from), address_topic(&to)];

        let err = event.decode_log(&topics, &[], &DecodeConfig::default()).unwrap_err();
        assert_eq!(err, AbiError::ZeroData);

        let log = event.decode_log(&topics, &[], &DecodeConfig::lenient()).unwrap();
        assert_eq!(log.params.len(), 2);
        assert_eq!(log.get("value"), None);
    }

    #[test]
    fn test_encode_topics() {
        let event = transfer_event();
        let to = Address::from_bytes([0x02; 20]);

        assert_eq!(event.encode_topics(&[]).unwrap(), vec![Some(event.topic())]);
        assert_eq!(
            event
                .encode_topics(&[None, Some(Token::Address(to))])
                .unwrap(),
            vec![Some(event.topic()), None, Some(address_topic(&to))]
        );
        assert_eq!(
            event.encode_topics(&[None, None, None]).unwrap_err(),
            AbiError::LengthMismatch {
                expected: 2,
                given: 3
            }
        );
    }

    #[test]
    fn test_encode_topics_roundtrip() {
        let event = transfer_event();
        let from = Address::from_bytes([0x01; 20]);
        let to = Address::from_bytes([0x02; 20]);
        let topics: Vec<H256> = event
            .encode_topics(&[Some(Token::Address(from)), Some(Token::Address(to))])
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        let log = event
            .decode_log(&topics, &[0u8; 32], &DecodeConfig::default())
            .unwrap();
        assert_eq!(log.get("from"), Some(&Token::Address(from)));
        assert_eq!(log.get("to"), Some(&Token::Address(to)));
    }

    #[test]
    fn test_encode_topics_hashes_dynamic_values() {
        // Foo(string message)
        let event = Event::new("Foo", vec![EventParam::new("message", ParamType::String, true)]);
        let topics = event.encode_topics(&[Some(Token::string("hello"))]).unwrap();
        assert_eq!(
            topics[0].unwrap().to_hex(),
            "0x9f0b7f1630bdb7d474466e2dfef0fb9dff65f7a50eec83935b68f77d0808f08a"
        );
        assert_eq!(
            topics[1].unwrap().to_hex(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_encode_topics_rejects_composites() {
        let ty = ParamType::parse("(uint256,string)").unwrap();
        let event = Event::new("Foo", vec![EventParam::new("foo", ty, true)]);
        let value = Token::Tuple(vec![Token::uint(1u64), Token::string("a")]);
        assert_eq!(
            event.encode_topics(&[Some(value)]).unwrap_err(),
            AbiError::FilterTypeNotSupported("(uint256,string)".to_string())
        );
    }

    #[test]
    fn test_encode_topics_anonymous() {
        let mut event = Event::new("Ping", vec![EventParam::new("id", ParamType::Uint(8), true)]);
        event.anonymous = true;
        let topics = event.encode_topics(&[Some(Token::uint(7u64))]).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].unwrap().as_bytes()[31], 7);

        assert!(matches!(
            event.encode_topics(&[Some(Token::uint(256u64))]),
            Err(AbiError::IntegerOutOfRange { .. })
        ));
    }

    #[test]
    fn test_anonymous_event_uses_all_topics() {
        let mut event = Event::new("Ping", vec![EventParam::new("id", ParamType::Uint(256), true)]);
        event.anonymous = true;
        let mut word = [0u8; 32];
        word[31] = 7;
        let log = event
            .decode_log(&[H256::from_bytes(word)], &[], &DecodeConfig::default())
            .unwrap();
        assert_eq!(log.get("id"), Some(&Token::uint(7u64)));
    }
}
