//! Binding decoded values onto destination fields.
//!
//! A destination type implements [`Record`] by publishing a static table of
//! [`FieldDescriptor`]s: the schema field name and an accessor for the slot
//! that receives it. The table is read once per destination type to build a
//! [`FieldMap`], which the decoder memoizes per session.
//!
//! Nullable fields use `Option<T>`: the null branch stores `None`, the
//! present branch stores `Some(value)`.
//!
//! ```
//! use avroframe::avro_record;
//!
//! #[derive(Debug, Default)]
//! struct Sample {
//!     id: i64,
//!     label: Option<String>,
//! }
//!
//! avro_record!(Sample {
//!     "id" => id,
//!     "label" => label,
//! });
//! ```

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::reader::Value;

/// A writable destination for one decoded value.
pub trait Slot {
    /// Store `value`, or report why it does not fit.
    ///
    /// `field` is only used to build the error.
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError>;
}

/// Field-descriptor table exposed by a destination type.
pub trait Record: 'static {
    /// Every bindable field, keyed by the schema name it advertises.
    fn descriptors() -> &'static [FieldDescriptor<Self>]
    where
        Self: Sized;
}

/// Schema name and slot accessor for one destination field.
pub struct FieldDescriptor<T> {
    /// Schema field name this slot answers to.
    pub name: &'static str,
    /// Borrow the slot out of the destination value.
    pub slot: fn(&mut T) -> &mut dyn Slot,
}

impl<T> FieldDescriptor<T> {
    /// Describe a field.
    pub const fn new(name: &'static str, slot: fn(&mut T) -> &mut dyn Slot) -> Self {
        Self { name, slot }
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Name -> position lookup over a destination type's descriptors.
#[derive(Debug)]
pub struct FieldMap<T: 'static> {
    descriptors: &'static [FieldDescriptor<T>],
    positions: HashMap<&'static str, usize>,
}

impl<T: Record> FieldMap<T> {
    /// Build the lookup for `T`. A later descriptor with a duplicate name
    /// shadows an earlier one.
    pub fn of() -> Self {
        let descriptors = T::descriptors();
        let positions = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, i))
            .collect();
        Self {
            descriptors,
            positions,
        }
    }
}

impl<T: 'static> FieldMap<T> {
    /// Number of bindable fields.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True if the destination exposes no fields.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve the slot for a schema field name.
    pub fn slot<'t>(&self, target: &'t mut T, name: &str) -> Result<&'t mut dyn Slot, DecodeError> {
        let position = self
            .positions
            .get(name)
            .ok_or_else(|| DecodeError::UndefinedField(name.to_string()))?;
        Ok((self.descriptors[*position].slot)(target))
    }

    /// Bind a value onto the named field.
    pub fn bind(&self, target: &mut T, name: &str, value: Value) -> Result<(), DecodeError> {
        self.slot(target, name)?.put(name, value)
    }
}

fn mismatch(field: &str, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: value.type_name(),
    }
}

impl Slot for bool {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Boolean(b) => *self = b,
            other => return Err(mismatch(field, "boolean", &other)),
        }
        Ok(())
    }
}

impl Slot for i32 {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Int(n) => *self = n,
            other => return Err(mismatch(field, "int", &other)),
        }
        Ok(())
    }
}

impl Slot for i64 {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Int(n) => *self = i64::from(n),
            Value::Long(n) => *self = n,
            other => return Err(mismatch(field, "long", &other)),
        }
        Ok(())
    }
}

impl Slot for f32 {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Float(n) => *self = n,
            other => return Err(mismatch(field, "float", &other)),
        }
        Ok(())
    }
}

impl Slot for f64 {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Float(n) => *self = f64::from(n),
            Value::Double(n) => *self = n,
            other => return Err(mismatch(field, "double", &other)),
        }
        Ok(())
    }
}

impl Slot for String {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::String(s) => *self = s,
            other => return Err(mismatch(field, "string", &other)),
        }
        Ok(())
    }
}

impl Slot for Vec<u8> {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Bytes(b) => *self = b,
            other => return Err(mismatch(field, "bytes", &other)),
        }
        Ok(())
    }
}

impl<T: Slot + Default> Slot for Option<T> {
    fn put(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        match value {
            Value::Null => *self = None,
            present => {
                let mut inner = T::default();
                inner.put(field, present)?;
                *self = Some(inner);
            }
        }
        Ok(())
    }
}

/// Implement [`Record`] for a struct by listing `"schema name" => field`.
#[macro_export]
macro_rules! avro_record {
    ($ty:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::bind::Record for $ty {
            fn descriptors() -> &'static [$crate::bind::FieldDescriptor<Self>] {
                const DESCRIPTORS: &[$crate::bind::FieldDescriptor<$ty>] = &[
                    $($crate::bind::FieldDescriptor::new($name, |t| &mut t.$field)),*
                ];
                DESCRIPTORS
            }
        }
    };
}
