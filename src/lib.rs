//! Avro binary decoding for schema-registry framed messages
//!
//! This library decodes Avro record bodies onto plain Rust structs, resolving
//! the writer's schema through a cached schema registry. A framed message is
//! a `0x00` magic byte, a big-endian schema id and the Avro body.

pub mod bind;
pub mod error;
pub mod frame;
pub mod messaging;
pub mod reader;
pub mod registry;
pub mod schema;

// Re-export main types
pub use bind::{FieldDescriptor, FieldMap, Record, Slot};
pub use error::{DecodeError, FrameError, MessagingError, RegistryError, SchemaError};
pub use frame::{read_frame, read_frame_bytes, write_frame};
pub use messaging::{Messaging, MessagingConfig};
pub use reader::{
    decode_boolean, decode_bytes, decode_bytes_ref, decode_double, decode_float, decode_int,
    decode_long, decode_null, decode_string, decode_string_ref, decode_varint, decode_zigzag,
    encode_varint, encode_zigzag, Cursor, Decoder, DecoderConfig, Value,
};
pub use registry::{
    BoxedRegistry, CachingRegistry, InMemoryRegistry, SchemaCache, SchemaRegistry,
};
pub use schema::{parse_schema, Field, LogicalType, RecordType, Schema, Type};
