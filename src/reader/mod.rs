//! Avro body decoding
//!
//! This module provides the varint codec, the forward-only cursor, the
//! primitive decoders and the record decoder that binds values onto
//! destination structs.

pub mod cursor;
pub mod decode;
pub mod record_decoder;
pub mod varint;

pub use cursor::Cursor;
pub use decode::{
    decode_boolean, decode_bytes, decode_bytes_ref, decode_double, decode_float, decode_int,
    decode_long, decode_null, decode_string, decode_string_ref, decode_union_index, decode_value,
    Value,
};
pub use record_decoder::{
    decode_field, decode_record, decode_record_with_map, Decoder, DecoderConfig,
};
pub use varint::{decode_varint, decode_zigzag, encode_varint, encode_zigzag, skip_varint};
