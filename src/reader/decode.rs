//! Avro binary decoders for primitive types.
//!
//! The decoder follows the Avro binary encoding:
//! - `int` and `long` are zigzag varints
//! - `float` and `double` are little-endian IEEE 754
//! - `bytes` and `string` are length-prefixed
//! - `null` occupies no bytes
//!
//! Every decoder either consumes a whole value or leaves the cursor alone.

use super::cursor::Cursor;
use crate::error::DecodeError;
use crate::schema::Type;

/// Decode a null value (no-op, consumes no bytes).
#[inline]
pub fn decode_null(_cursor: &mut Cursor<'_>) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean value: a single byte, 0x00 for false, 0x01 for true.
#[inline]
pub fn decode_boolean(cursor: &mut Cursor<'_>) -> Result<bool, DecodeError> {
    let mut work = cursor.clone();
    let value = match work.read_byte()? {
        0 => false,
        1 => true,
        byte => {
            return Err(DecodeError::InvalidData(format!(
                "Invalid boolean value: {}, expected 0 or 1",
                byte
            )))
        }
    };
    *cursor = work;
    Ok(value)
}

/// Decode a 32-bit signed integer.
///
/// This is a truncating view over the 64-bit decode, so an over-wide value
/// keeps its low 32 bits.
#[inline]
pub fn decode_int(cursor: &mut Cursor<'_>) -> Result<i32, DecodeError> {
    cursor.read_int()
}

/// Decode a 64-bit signed integer.
#[inline]
pub fn decode_long(cursor: &mut Cursor<'_>) -> Result<i64, DecodeError> {
    cursor.read_long()
}

/// Decode a 32-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_float(cursor: &mut Cursor<'_>) -> Result<f32, DecodeError> {
    let bytes = cursor.take(4)?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode a 64-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_double(cursor: &mut Cursor<'_>) -> Result<f64, DecodeError> {
    let bytes = cursor.take(8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(buf))
}

/// Decode a byte array without copying. Zero length is allowed.
#[inline]
pub fn decode_bytes_ref<'a>(cursor: &mut Cursor<'a>) -> Result<&'a [u8], DecodeError> {
    let mut work = cursor.clone();
    let len = work.read_long()?;
    if len < 0 {
        return Err(DecodeError::InvalidLength(len));
    }
    let bytes = work.take(len as usize)?;
    *cursor = work;
    Ok(bytes)
}

/// Decode a byte array (length-prefixed).
#[inline]
pub fn decode_bytes(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, DecodeError> {
    decode_bytes_ref(cursor).map(<[u8]>::to_vec)
}

/// Decode a UTF-8 string without copying.
///
/// The length prefix must be strictly positive: zero and negative lengths
/// fail with `InvalidLength`. When fewer bytes remain than the prefix
/// declares, nothing is consumed, prefix included.
#[inline]
pub fn decode_string_ref<'a>(cursor: &mut Cursor<'a>) -> Result<&'a str, DecodeError> {
    let mut work = cursor.clone();
    let len = work.read_long()?;
    if len <= 0 {
        return Err(DecodeError::InvalidLength(len));
    }
    let bytes = work.take(len as usize)?;
    let s = std::str::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
    *cursor = work;
    Ok(s)
}

/// Decode a UTF-8 string (length-prefixed).
#[inline]
pub fn decode_string(cursor: &mut Cursor<'_>) -> Result<String, DecodeError> {
    decode_string_ref(cursor).map(str::to_owned)
}

/// Decode a union branch selector and check it against the branch count.
#[inline]
pub fn decode_union_index(
    cursor: &mut Cursor<'_>,
    num_branches: usize,
) -> Result<usize, DecodeError> {
    let mut work = cursor.clone();
    let index = work.read_long()?;
    if index < 0 || index as u64 >= num_branches as u64 {
        return Err(DecodeError::InvalidUnionIndex {
            index,
            branches: num_branches,
        });
    }
    *cursor = work;
    Ok(index as usize)
}

// ============================================================================
// Values
// ============================================================================

/// A decoded primitive, ready to be bound into a destination slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// The Avro type name of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
        }
    }
}

/// Decode any supported value based on its type.
///
/// Unions decode their selector and yield the selected branch's value.
/// Logical types decode as their base type. Records are not values in this
/// sense and fail with `UnsupportedType`; use the record decoder instead.
pub fn decode_value(cursor: &mut Cursor<'_>, ty: &Type) -> Result<Value, DecodeError> {
    match ty {
        Type::Null => decode_null(cursor).map(|_| Value::Null),
        Type::Boolean => decode_boolean(cursor).map(Value::Boolean),
        Type::Int => decode_int(cursor).map(Value::Int),
        Type::Long => decode_long(cursor).map(Value::Long),
        Type::Float => decode_float(cursor).map(Value::Float),
        Type::Double => decode_double(cursor).map(Value::Double),
        Type::Bytes => decode_bytes(cursor).map(Value::Bytes),
        Type::String => decode_string(cursor).map(Value::String),
        Type::Union(branches) => {
            let mut work = cursor.clone();
            let index = decode_union_index(&mut work, branches.len())?;
            let value = decode_value(&mut work, &branches[index])?;
            *cursor = work;
            Ok(value)
        }
        Type::Logical(logical) => decode_value(cursor, &logical.base),
        Type::Record(_) | Type::Named(_) => {
            Err(DecodeError::UnsupportedType(ty.type_name().to_string()))
        }
    }
}
