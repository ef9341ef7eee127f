//! ABI error types

use bach_primitives::U256;
use thiserror::Error;

/// Result alias for ABI operations
pub type Result<T> = std::result::Result<T, AbiError>;

/// ABI codec and item lookup error.
///
/// Every variant is a deterministic fault of the inputs; nothing here is
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Number of values differs from number of parameters
    #[error("ABI encoding params/values length mismatch: expected {expected} values, got {given}")]
    LengthMismatch {
        /// Parameter count
        expected: usize,
        /// Value count
        given: usize,
    },

    /// Type string matches no ABI type
    #[error("invalid ABI type \"{0}\"")]
    InvalidType(String),

    /// Fixed array value of the wrong length
    #[error("ABI encoding array length mismatch for type {ty}: expected {expected}, got {given}")]
    ArrayLengthMismatch {
        /// Declared type
        ty: String,
        /// Declared length
        expected: usize,
        /// Value length
        given: usize,
    },

    /// Positional tuple value with the wrong number of entries
    #[error("ABI encoding tuple length mismatch for type {ty}: expected {expected}, got {given}")]
    TupleLengthMismatch {
        /// Declared type
        ty: String,
        /// Component count
        expected: usize,
        /// Value entry count
        given: usize,
    },

    /// Named tuple value lacking a component
    #[error("missing field \"{field}\" for type {ty}")]
    MissingTupleField {
        /// Declared type
        ty: String,
        /// Component name
        field: String,
    },

    /// Value kind does not fit the declared type
    #[error("cannot encode {value} value as {ty}")]
    TypeMismatch {
        /// Declared type
        ty: String,
        /// Kind of the value supplied
        value: &'static str,
    },

    /// Fixed-size bytes value of the wrong length
    #[error("expected bytes{expected}, got {given} bytes")]
    BytesSizeMismatch {
        /// Declared size
        expected: usize,
        /// Value size
        given: usize,
    },

    /// Integer does not fit the declared bit width
    #[error("value {value} is out of range for type {ty}")]
    IntegerOutOfRange {
        /// Declared type
        ty: String,
        /// Offending value
        value: String,
    },

    /// Empty buffer while parameters are expected
    #[error("cannot decode zero data (\"0x\") with ABI parameters")]
    ZeroData,

    /// Buffer length is not a multiple of 32
    #[error("data size of {size} bytes is invalid: size must be a multiple of 32 bytes")]
    DataSizeInvalid {
        /// Buffer size
        size: usize,
    },

    /// Buffer too short for the parameter heads
    #[error("data size of {size} bytes is too small for the given parameters")]
    DataSizeTooSmall {
        /// Buffer size
        size: usize,
    },

    /// Offset or length points outside the buffer
    #[error("read of {len} bytes at position {position} is out of bounds for {size} bytes of data")]
    OutOfBounds {
        /// Read start
        position: usize,
        /// Read length
        len: usize,
        /// Buffer size
        size: usize,
    },

    /// Offset or length word too large to address memory
    #[error("offset or length {0} does not fit in memory")]
    OffsetOverflow(U256),

    /// Bool word other than 0 or 1
    #[error("invalid boolean word 0x{0}")]
    InvalidBool(String),

    /// String payload is not UTF-8
    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(String),

    /// Type that packed encoding cannot express
    #[error("type {0} is not supported for packed encoding")]
    UnsupportedPackedType(String),

    /// Unknown function name
    #[error("function \"{0}\" not found on ABI")]
    FunctionNotFound(String),

    /// Unknown function selector
    #[error("function selector 0x{0} not found on ABI")]
    FunctionSignatureNotFound(String),

    /// Unknown event name
    #[error("event \"{0}\" not found on ABI")]
    EventNotFound(String),

    /// Unknown event topic
    #[error("event signature {0} not found on ABI")]
    EventSignatureNotFound(String),

    /// Log without topics for a non-anonymous event
    #[error("cannot extract event signature from empty topics")]
    EmptyTopics,

    /// Log lacks a topic for an indexed parameter
    #[error("expected a topic for indexed parameter \"{param}\" of event {event}")]
    TopicsMismatch {
        /// Event signature
        event: String,
        /// Parameter name or position
        param: String,
    },

    /// Indexed parameter type that has no topic filter form
    #[error("filter type \"{0}\" is not supported")]
    FilterTypeNotSupported(String),

    /// Unknown custom error name
    #[error("error \"{0}\" not found on ABI")]
    ErrorNotFound(String),

    /// Unknown error selector
    #[error("error selector 0x{0} not found on ABI")]
    ErrorSignatureNotFound(String),

    /// Constructor arguments given but the ABI has no constructor
    #[error("constructor not found on ABI")]
    ConstructorNotFound,

    /// Deploy data does not start with the expected bytecode
    #[error("deploy data does not start with the contract bytecode")]
    BytecodeMismatch,

    /// JSON ABI could not be parsed
    #[error("invalid JSON ABI: {0}")]
    InvalidJson(String),
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidJson(e.to_string())
    }
}
