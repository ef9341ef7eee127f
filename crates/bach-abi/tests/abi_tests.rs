//! ABI item integration tests for bach-abi
//!
//! Tests JSON ABI loading, call data, event logs, revert data and the
//! contract helper.

use bach_abi::{
    encode_packed, erc20, Abi, AbiError, Address, Contract, DecodeConfig, ParamType, RawLog,
    RevertReason, Token, H256, U256,
};
use bach_crypto::keccak256;

const TOKEN_ABI: &str = r#"[
    {
        "type": "constructor",
        "stateMutability": "nonpayable",
        "inputs": [
            {"name": "name", "type": "string", "internalType": "string"},
            {"name": "supply", "type": "uint256", "internalType": "uint256"}
        ]
    },
    {
        "type": "function",
        "name": "transfer",
        "stateMutability": "nonpayable",
        "inputs": [
            {"name": "to", "type": "address", "internalType": "address"},
            {"name": "amount", "type": "uint256", "internalType": "uint256"}
        ],
        "outputs": [{"name": "", "type": "bool", "internalType": "bool"}]
    },
    {
        "type": "function",
        "name": "batch",
        "stateMutability": "payable",
        "inputs": [
            {
                "name": "orders",
                "type": "tuple[]",
                "internalType": "struct Token.Order[]",
                "components": [
                    {"name": "to", "type": "address"},
                    {"name": "memo", "type": "string"}
                ]
            }
        ],
        "outputs": []
    },
    {
        "type": "event",
        "name": "Transfer",
        "anonymous": false,
        "inputs": [
            {"name": "from", "type": "address", "indexed": true},
            {"name": "to", "type": "address", "indexed": true},
            {"name": "value", "type": "uint256", "indexed": false}
        ]
    },
    {
        "type": "event",
        "name": "Memo",
        "anonymous": false,
        "inputs": [
            {"name": "topic", "type": "string", "indexed": true},
            {"name": "body", "type": "string", "indexed": false}
        ]
    },
    {
        "type": "error",
        "name": "InsufficientBalance",
        "inputs": [
            {"name": "available", "type": "uint256"},
            {"name": "required", "type": "uint256"}
        ]
    }
]"#;

fn abi() -> Abi {
    Abi::from_json(TOKEN_ABI).unwrap()
}

fn address_topic(addr: &Address) -> H256 {
    H256::from_bytes(addr.to_word())
}

// ==================== JSON ABI Tests ====================

#[test]
fn test_json_signatures() {
    let abi = abi();
    assert_eq!(abi.function("transfer").unwrap().signature(), "transfer(address,uint256)");
    assert_eq!(abi.function("batch").unwrap().signature(), "batch((address,string)[])");
    assert_eq!(abi.event("Transfer").unwrap().signature(), "Transfer(address,address,uint256)");
    assert_eq!(
        abi.error("InsufficientBalance").unwrap().signature(),
        "InsufficientBalance(uint256,uint256)"
    );
}

#[test]
fn test_function_lookup_by_selector() {
    let abi = abi();
    let function = abi.function_by_selector([0xa9, 0x05, 0x9c, 0xbb]).unwrap();
    assert_eq!(function.name, "transfer");
}

#[test]
fn test_decode_function_data() {
    let abi = abi();
    let to = Address::from_bytes([0x22; 20]);
    let data = abi
        .encode_function_data("transfer", &[Token::Address(to), Token::uint(5u64)])
        .unwrap();

    let (function, args) = abi.decode_function_data(&data).unwrap();
    assert_eq!(function.name, "transfer");
    assert_eq!(args, vec![Token::Address(to), Token::uint(5u64)]);
}

#[test]
fn test_struct_arguments_roundtrip() {
    let abi = abi();
    let orders = Token::Array(vec![
        Token::structure([
            ("to", Token::Address(Address::from_bytes([1; 20]))),
            ("memo", Token::string("first")),
        ]),
        Token::structure([
            ("to", Token::Address(Address::from_bytes([2; 20]))),
            ("memo", Token::string("")),
        ]),
    ]);
    let data = abi.encode_function_data("batch", &[orders.clone()]).unwrap();
    let (_, args) = abi.decode_function_data(&data).unwrap();
    assert_eq!(args, vec![orders]);
}

#[test]
fn test_deploy_data_roundtrip() {
    let abi = abi();
    let bytecode = hex::decode("6080604052").unwrap();
    let args = vec![Token::string("Bach"), Token::uint(1_000_000u64)];
    let data = abi.encode_deploy_data(&bytecode, &args).unwrap();
    let constructor = abi.constructor.as_ref().unwrap();
    assert_eq!(constructor.decode_deploy_data(&bytecode, &data).unwrap(), args);
}

// ==================== Event Log Tests ====================

#[test]
fn test_decode_transfer_log() {
    let abi = abi();
    let from = Address::from_bytes([0xaa; 20]);
    let to = Address::from_bytes([0xbb; 20]);
    let topics = [
        H256::from_hex("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
            .unwrap(),
        address_topic(&from),
        address_topic(&to),
    ];
    let data = bach_abi::encode(&[ParamType::Uint(256)], &[Token::uint(42u64)]).unwrap();

    let log = abi.decode_event_log(&topics, &data, &DecodeConfig::default()).unwrap();
    assert_eq!(log.event, "Transfer");
    assert_eq!(log.get("from"), Some(&Token::Address(from)));
    assert_eq!(log.get("to"), Some(&Token::Address(to)));
    assert_eq!(log.get("value"), Some(&Token::uint(42u64)));
}

#[test]
fn test_indexed_string_is_topic_hash() {
    let abi = abi();
    let event = abi.event("Memo").unwrap();
    let topic_hash = keccak256("greeting");
    let data = bach_abi::encode(&[ParamType::String], &[Token::string("hello")]).unwrap();

    let log = abi
        .decode_event_log(&[event.topic(), topic_hash], &data, &DecodeConfig::default())
        .unwrap();
    assert_eq!(log.get("topic"), Some(&Token::bytes32(topic_hash)));
    assert_eq!(log.get("body"), Some(&Token::string("hello")));
}

#[test]
fn test_unknown_event_topic() {
    let abi = abi();
    let err = abi
        .decode_event_log(&[keccak256("Nope()")], &[], &DecodeConfig::default())
        .unwrap_err();
    assert!(matches!(err, AbiError::EventSignatureNotFound(_)));
    assert_eq!(
        abi.decode_event_log(&[], &[], &DecodeConfig::default()).unwrap_err(),
        AbiError::EmptyTopics
    );
}

#[test]
fn test_non_strict_log_skips_bad_data() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bach_abi=debug")
        .with_test_writer()
        .try_init();

    let abi = abi();
    let event = abi.event("Transfer").unwrap();
    let from = Address::from_bytes([0xaa; 20]);
    let to = Address::from_bytes([0xbb; 20]);
    let topics = [event.topic(), address_topic(&from), address_topic(&to)];
    let truncated = [0u8; 16];

    let strict = DecodeConfig::default();
    assert_eq!(
        abi.decode_event_log(&topics, &truncated, &strict).unwrap_err(),
        AbiError::DataSizeInvalid { size: 16 }
    );

    let relaxed: DecodeConfig = serde_json::from_str(r#"{"strict": false}"#).unwrap();
    let log = abi.decode_event_log(&topics, &truncated, &relaxed).unwrap();
    assert_eq!(log.params.len(), 2);
    assert_eq!(log.get("value"), None);
}

#[test]
fn test_transfer_filter_topics() {
    let abi = abi();
    let event = abi.event("Transfer").unwrap();
    let to = Address::from_hex("0xa5cc3c03994DB5b0d9A5eEdD10CabaB0813678AC").unwrap();
    let topics = event.encode_topics(&[None, Some(Token::Address(to))]).unwrap();
    assert_eq!(topics.len(), 3);
    assert_eq!(topics[0], Some(event.topic()));
    assert_eq!(topics[1], None);
    assert_eq!(
        topics[2].unwrap().to_hex(),
        "0x000000000000000000000000a5cc3c03994db5b0d9a5eedd10cabab0813678ac"
    );
}

#[test]
fn test_indexed_string_topic_matches_log() {
    let abi = abi();
    let event = abi.event("Memo").unwrap();
    let topics = event.encode_topics(&[Some(Token::string("greeting"))]).unwrap();
    assert_eq!(topics[1], Some(keccak256("greeting")));
}

fn transfer_log(from: Address, to: Address, value: u64) -> RawLog {
    let topic = abi().event("Transfer").unwrap().topic();
    let data = bach_abi::encode(&[ParamType::Uint(256)], &[Token::uint(value)]).unwrap();
    RawLog::new(vec![topic, address_topic(&from), address_topic(&to)], data)
}

fn memo_log(body: &str) -> RawLog {
    let topic = abi().event("Memo").unwrap().topic();
    let data = bach_abi::encode(&[ParamType::String], &[Token::string(body)]).unwrap();
    RawLog::new(vec![topic, keccak256("memo")], data)
}

#[test]
fn test_decode_logs_skips_foreign_events() {
    let abi = abi();
    let a = Address::from_bytes([0xaa; 20]);
    let b = Address::from_bytes([0xbb; 20]);
    let logs = vec![
        transfer_log(a, b, 1),
        RawLog::new(vec![keccak256("Unrelated(uint256)")], vec![0u8; 32]),
        memo_log("hi"),
        RawLog::default(),
        transfer_log(b, a, 2),
    ];

    let decoded = abi.decode_logs(&logs, &[], &DecodeConfig::default());
    let names: Vec<&str> = decoded.iter().map(|log| log.event.as_str()).collect();
    assert_eq!(names, vec!["Transfer", "Memo", "Transfer"]);
    assert_eq!(decoded[2].get("value"), Some(&Token::uint(2u64)));
}

#[test]
fn test_decode_logs_filters_by_event_name() {
    let abi = abi();
    let a = Address::from_bytes([0xaa; 20]);
    let logs = vec![transfer_log(a, a, 1), memo_log("x"), transfer_log(a, a, 3)];

    let transfers = abi.decode_logs(&logs, &["Transfer"], &DecodeConfig::default());
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|log| log.event == "Transfer"));

    let both = abi.decode_logs(&logs, &["Memo", "Transfer"], &DecodeConfig::default());
    assert_eq!(both.len(), 3);
}

#[test]
fn test_decode_logs_strictness() {
    let abi = abi();
    let a = Address::from_bytes([0xaa; 20]);
    let mut bad = transfer_log(a, a, 1);
    bad.data.truncate(16);
    let mut missing_topic = transfer_log(a, a, 1);
    missing_topic.topics.pop();
    let logs = vec![transfer_log(a, a, 1), bad, missing_topic];

    let strict = abi.decode_logs(&logs, &[], &DecodeConfig::default());
    assert_eq!(strict.len(), 1);

    let relaxed = abi.decode_logs(&logs, &[], &DecodeConfig::lenient());
    assert_eq!(relaxed.len(), 2);
    assert_eq!(relaxed[1].get("value"), None);
    assert_eq!(relaxed[1].get("from"), Some(&Token::Address(a)));
}

// ==================== Revert Tests ====================

#[test]
fn test_decode_error_string_revert() {
    // Error("insufficient")
    let data = hex::decode(
        "08c379a0\
         0000000000000000000000000000000000000000000000000000000000000020\
         000000000000000000000000000000000000000000000000000000000000000c\
         696e73756666696369656e740000000000000000000000000000000000000000",
    )
    .unwrap();
    assert_eq!(
        abi().decode_error_result(&data).unwrap(),
        RevertReason::Error("insufficient".to_string())
    );
}

#[test]
fn test_decode_panic_revert() {
    let data = hex::decode(
        "4e487b71\
         0000000000000000000000000000000000000000000000000000000000000012",
    )
    .unwrap();
    match abi().decode_error_result(&data).unwrap() {
        RevertReason::Panic { code, reason } => {
            assert_eq!(code, U256::from(0x12));
            assert_eq!(reason, Some("division or modulo by zero"));
        }
        other => panic!("unexpected revert reason: {:?}", other),
    }
}

#[test]
fn test_decode_custom_error_revert() {
    let abi = abi();
    let error = abi.error("InsufficientBalance").unwrap();
    let data = error.encode(&[Token::uint(1u64), Token::uint(10u64)]).unwrap();
    assert_eq!(
        abi.decode_error_result(&data).unwrap(),
        RevertReason::Custom {
            name: "InsufficientBalance".to_string(),
            args: vec![Token::uint(1u64), Token::uint(10u64)],
        }
    );
}

// ==================== Contract Tests ====================

#[test]
fn test_contract_from_json_abi() {
    let address = Address::from_bytes([0x77; 20]);
    let contract = Contract::new(address, abi());
    let data = contract
        .encode_call("transfer", &[Token::Address(Address::ZERO), Token::uint(1u64)])
        .unwrap();
    assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

    let err = contract
        .encode_call("transfer", &[Token::Bool(true), Token::uint(1u64)])
        .unwrap_err();
    assert_eq!(err.contract, address);
    assert_eq!(err.function, "transfer");
    assert_eq!(
        err.source,
        AbiError::TypeMismatch {
            ty: "address".to_string(),
            value: "bool"
        }
    );
}

#[test]
fn test_contract_overloaded_call() {
    let abi = Abi::from_json(
        r#"[
            {"type": "function", "name": "mint", "inputs": [{"name": "to", "type": "address"}]},
            {"type": "function", "name": "mint", "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]}
        ]"#,
    )
    .unwrap();
    let contract = Contract::new(Address::ZERO, abi);

    let single = contract.encode_call("mint", &[Token::Address(Address::ZERO)]).unwrap();
    assert_eq!(single.len(), 36);
    let double = contract
        .encode_call("mint", &[Token::Address(Address::ZERO), Token::uint(5u64)])
        .unwrap();
    assert_eq!(double.len(), 68);
    assert_ne!(&single[..4], &double[..4]);
}

#[test]
fn test_erc20_approve_selector() {
    let contract = erc20(Address::ZERO);
    let data = contract
        .encode_call("approve", &[Token::Address(Address::ZERO), Token::Uint(U256::MAX)])
        .unwrap();
    assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    assert_eq!(&data[36..], &[0xff; 32]);
}

// ==================== Packed Encoding Tests ====================

#[test]
fn test_packed_hash_matches_string_concat() {
    let packed = encode_packed(
        &[ParamType::String, ParamType::String],
        &[Token::string("bach"), Token::string("ledger")],
    )
    .unwrap();
    assert_eq!(keccak256(&packed), keccak256("bachledger"));
}
