//! Record decoder binding Avro bodies onto destination structs.
//!
//! Records have no field tags: the only framing is the declared field order,
//! so fields are decoded strictly in schema order and the first failure ends
//! the decode.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::cursor::Cursor;
use super::decode::{decode_union_index, decode_value, Value};
use crate::bind::{FieldMap, Record};
use crate::error::DecodeError;
use crate::schema::{Field, Schema, Type};

/// Decoder configuration.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Fail with `TrailingBytes` when the body is longer than the record
    /// (default: false).
    pub require_exhausted: bool,
}

impl DecoderConfig {
    /// Create a new DecoderConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every byte of the body to be consumed by the record.
    pub fn with_require_exhausted(mut self, require_exhausted: bool) -> Self {
        self.require_exhausted = require_exhausted;
        self
    }
}

/// A decoding session.
///
/// Holds the configuration and a memo of [`FieldMap`]s, one per destination
/// type decoded through this session. The memo lives as long as the session
/// and is safe to share across threads; each decode call still uses its own
/// cursor.
#[derive(Default)]
pub struct Decoder {
    config: DecoderConfig,
    field_maps: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Decoder {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            field_maps: Mutex::new(HashMap::new()),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The field map for `T`, built on first use.
    pub fn field_map<T: Record>(&self) -> Arc<FieldMap<T>> {
        let mut maps = self
            .field_maps
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = maps
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(FieldMap::<T>::of()) as Arc<dyn Any + Send + Sync>)
            .clone();
        drop(maps);
        match entry.downcast::<FieldMap<T>>() {
            Ok(map) => map,
            // Keys are the TypeId of the stored map's type parameter.
            Err(_) => Arc::new(FieldMap::of()),
        }
    }

    /// Decode one record from `buffer` into `target`.
    ///
    /// # Errors
    /// - `UnsupportedType` if the schema root is not a record, or a field
    ///   uses a type the decoder does not interpret
    /// - any error from [`decode_field`]
    /// - `TrailingBytes` if `require_exhausted` is set and bytes remain
    pub fn decode_record<T: Record>(
        &self,
        target: &mut T,
        schema: &Schema,
        buffer: &[u8],
    ) -> Result<(), DecodeError> {
        let map = self.field_map::<T>();
        let mut cursor = Cursor::new(buffer);
        decode_record_with_map(target, &map, schema, &mut cursor)?;
        if self.config.require_exhausted && !cursor.is_exhausted() {
            return Err(DecodeError::TrailingBytes(cursor.remaining_len()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shapes = self
            .field_maps
            .lock()
            .map(|m| m.len())
            .unwrap_or_default();
        f.debug_struct("Decoder")
            .field("config", &self.config)
            .field("shapes", &shapes)
            .finish()
    }
}

/// Decode one record without a session.
///
/// Builds the destination's field map for this call only. Prefer a
/// [`Decoder`] when decoding many records.
pub fn decode_record<T: Record>(
    target: &mut T,
    schema: &Schema,
    buffer: &[u8],
) -> Result<(), DecodeError> {
    let map = FieldMap::<T>::of();
    decode_record_with_map(target, &map, schema, &mut Cursor::new(buffer))
}

/// Decode the fields of a record-rooted schema in declared order.
pub fn decode_record_with_map<T: Record>(
    target: &mut T,
    map: &FieldMap<T>,
    schema: &Schema,
    cursor: &mut Cursor<'_>,
) -> Result<(), DecodeError> {
    let record = schema
        .as_record()
        .ok_or_else(|| DecodeError::UnsupportedType(schema.root().type_name().to_string()))?;

    for field in &record.fields {
        decode_field(target, map, field, cursor)?;
    }
    Ok(())
}

/// Decode one field and bind it onto `target` under the field's name.
///
/// - primitives decode and bind their value
/// - `null` binds the absent state and consumes nothing
/// - unions read the branch selector, then decode the selected branch under
///   the same field name
/// - logical types decode as their base type
/// - nested records fail with `UnsupportedType`
pub fn decode_field<T: Record>(
    target: &mut T,
    map: &FieldMap<T>,
    field: &Field,
    cursor: &mut Cursor<'_>,
) -> Result<(), DecodeError> {
    decode_field_with_type(target, map, &field.name, &field.ty, cursor)
}

fn decode_field_with_type<T: Record>(
    target: &mut T,
    map: &FieldMap<T>,
    name: &str,
    ty: &Type,
    cursor: &mut Cursor<'_>,
) -> Result<(), DecodeError> {
    match ty {
        Type::Null => map.bind(target, name, Value::Null),
        Type::Union(branches) => {
            let index = decode_union_index(cursor, branches.len())?;
            decode_field_with_type(target, map, name, &branches[index], cursor)
        }
        Type::Logical(logical) => decode_field_with_type(target, map, name, &logical.base, cursor),
        Type::Record(_) | Type::Named(_) => {
            Err(DecodeError::UnsupportedType(ty.type_name().to_string()))
        }
        primitive => {
            // Resolve the slot before touching the cursor so an unknown
            // field name fails without consuming its bytes.
            map.slot(target, name)?;
            let value = decode_value(cursor, primitive)?;
            map.bind(target, name, value)
        }
    }
}
