//! Error types for Avro decoding, framing and schema resolution

use thiserror::Error;

/// Errors that can occur during schema operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Invalid schema format
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Unsupported schema type
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors that can occur while decoding an Avro body.
///
/// Every variant is terminal for the decode call that produced it. The
/// decoder never substitutes a default to keep going, because records carry
/// no framing of their own and a guessed value would shift every later field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Ran out of bytes mid varint or mid string
    #[error("Unexpected end of input")]
    TruncatedInput,
    /// Declared string length is zero or negative
    #[error("Invalid length: {0}")]
    InvalidLength(i64),
    /// Union branch selector out of range
    #[error("Union index {index} out of range (0..{branches})")]
    InvalidUnionIndex { index: i64, branches: usize },
    /// Schema node the decoder cannot interpret
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema field has no matching slot on the destination
    #[error("Undefined field `{0}`")]
    UndefinedField(String),
    /// Decoded value does not fit the destination slot
    #[error("Type mismatch for field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Varint continues past 10 bytes
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    /// Payload had bytes left after the record was decoded
    #[error("{0} trailing byte(s) after record")]
    TrailingBytes(usize),
}

/// Errors raised while reading the registry wire frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Fewer than 5 bytes supplied
    #[error("Data too short: {0} byte(s)")]
    TooShort(usize),
    /// First byte is not the 0x00 magic byte
    #[error("Expected data to begin with a magic byte, got `{0}`")]
    BadMagicByte(u8),
}

/// Errors reported by a schema registry collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No schema registered under this id
    #[error("Schema {0} not found")]
    NotFound(u32),
    /// Subject has no registration for the given schema
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),
    /// Transport-level failure talking to the registry
    #[error("Transport error: {0}")]
    Transport(String),
    /// Registry returned a schema that could not be parsed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Top-level error for the messaging facade
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Wire frame rejected
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Schema could not be resolved
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Body decode failed
    #[error("Decode error for schema {schema_id}: {source}")]
    Decode {
        schema_id: u32,
        #[source]
        source: DecodeError,
    },

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl MessagingError {
    /// The underlying decode error, if this is one.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            MessagingError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}
