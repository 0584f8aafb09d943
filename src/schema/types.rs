//! Avro schema model.
//!
//! A [`Schema`] is an immutable root [`Type`] plus the fully-qualified name
//! used for registry subjects. It is shared behind an `Arc` by every decode
//! call that needs it and is never mutated after construction.

use serde_json::{json, Map, Value};

/// An Avro type node.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Null type - no value, no bytes on the wire.
    Null,
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of bytes.
    Bytes,
    /// Unicode string.
    String,
    /// Record type with positional fields.
    Record(RecordType),
    /// Union of branch types. The branch index is the wire discriminator.
    Union(Vec<Type>),
    /// Logical annotation over a base type.
    Logical(LogicalType),
    /// Reference to a record by fully-qualified name, used where a record
    /// refers to itself while it is still being defined.
    Named(String),
}

/// A named record and its fields, in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// The name of the record.
    pub name: String,
    /// Optional namespace for the record.
    pub namespace: Option<String>,
    /// The fields of the record. Declared order is decode order.
    pub fields: Vec<Field>,
}

impl RecordType {
    /// Create a new record type with the given name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("record"));
        obj.insert("name".to_string(), json!(&self.name));
        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }
        let fields: Vec<Value> = self.fields.iter().map(Field::to_json_value).collect();
        obj.insert("fields".to_string(), Value::Array(fields));
        Value::Object(obj)
    }
}

/// A record field: the binding name and its wire type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The name of the field, used to find the destination slot.
    pub name: String,
    /// The type of the field's value.
    pub ty: Type,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    fn to_json_value(&self) -> Value {
        json!({
            "name": &self.name,
            "type": self.ty.to_json_value(),
        })
    }
}

/// Logical type annotation. Does not change the wire encoding of `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    /// The underlying type.
    pub base: Box<Type>,
    /// The logical type name, e.g. `decimal` or `timestamp-millis`.
    pub name: String,
    /// Extra attributes such as `precision` and `scale`.
    pub properties: Map<String, Value>,
}

impl LogicalType {
    /// Create a new logical annotation with no extra attributes.
    pub fn new(base: Type, name: impl Into<String>) -> Self {
        Self {
            base: Box::new(base),
            name: name.into(),
            properties: Map::new(),
        }
    }

    /// Attach an extra attribute.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    fn to_json_value(&self) -> Value {
        let mut obj = match self.base.to_json_value() {
            Value::Object(m) => m,
            base => {
                let mut m = Map::new();
                m.insert("type".to_string(), base);
                m
            }
        };
        obj.insert("logicalType".to_string(), json!(&self.name));
        for (key, value) in &self.properties {
            obj.insert(key.clone(), value.clone());
        }
        Value::Object(obj)
    }
}

impl Type {
    /// Convenience constructor for the `["null", inner]` union.
    pub fn nullable(inner: Type) -> Self {
        Type::Union(vec![Type::Null, inner])
    }

    /// Check if this type is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Null
                | Type::Boolean
                | Type::Int
                | Type::Long
                | Type::Float
                | Type::Double
                | Type::Bytes
                | Type::String
        )
    }

    /// The Avro type name of this node (the base name for logical types).
    pub fn type_name(&self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Boolean => "boolean",
            Type::Int => "int",
            Type::Long => "long",
            Type::Float => "float",
            Type::Double => "double",
            Type::Bytes => "bytes",
            Type::String => "string",
            Type::Record(_) | Type::Named(_) => "record",
            Type::Union(_) => "union",
            Type::Logical(l) => l.base.type_name(),
        }
    }

    /// Check if this type is a union that contains null.
    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Union(branches) => branches.iter().any(|b| matches!(b, Type::Null)),
            _ => false,
        }
    }

    /// For a two-branch nullable union, get the non-null branch.
    pub fn nullable_inner(&self) -> Option<&Type> {
        match self {
            Type::Union(branches) if branches.len() == 2 => {
                branches.iter().find(|b| !matches!(b, Type::Null))
            }
            _ => None,
        }
    }

    /// Serialize the type to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        match self {
            Type::Record(r) => r.to_json_value(),
            Type::Union(branches) => {
                Value::Array(branches.iter().map(Type::to_json_value).collect())
            }
            Type::Logical(l) => l.to_json_value(),
            Type::Named(fullname) => json!(fullname),
            primitive => json!(primitive.type_name()),
        }
    }
}

/// A parsed schema: root type plus the name used for registry subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: Type,
    fullname: Option<String>,
}

impl Schema {
    /// Wrap a root type. The fully-qualified name is taken from a record root.
    pub fn new(root: Type) -> Self {
        let fullname = match &root {
            Type::Record(r) => Some(r.fullname()),
            _ => None,
        };
        Self { root, fullname }
    }

    /// Shorthand for a record-rooted schema.
    pub fn record(record: RecordType) -> Self {
        Self::new(Type::Record(record))
    }

    /// The root type.
    pub fn root(&self) -> &Type {
        &self.root
    }

    /// The root record, if the schema is record-rooted.
    pub fn as_record(&self) -> Option<&RecordType> {
        match &self.root {
            Type::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The fully-qualified name, if any.
    pub fn fullname(&self) -> Option<&str> {
        self.fullname.as_deref()
    }

    /// Compact JSON with sorted object keys.
    ///
    /// Two schemas with the same structure always produce the same string,
    /// which makes this usable as a cache key.
    pub fn canonical_form(&self) -> String {
        self.root.to_json_value().to_string()
    }
}

impl From<RecordType> for Schema {
    fn from(record: RecordType) -> Self {
        Schema::record(record)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_form())
    }
}
