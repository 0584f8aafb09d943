//! Avro schema model and parsing.
//!
//! This module defines the type model the decoder walks (primitives, records,
//! unions and logical annotations) and a JSON parser producing it.

mod parser;
mod types;

pub use parser::{parse_schema, parse_schema_with_options, SchemaParser};
pub use types::*;
