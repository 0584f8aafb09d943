//! JSON schema parser.
//!
//! Parses Avro schema JSON into the [`Type`] model. Only the types the
//! decoder understands are accepted: primitives, records, unions and logical
//! annotations over those. `enum`, `array`, `map` and `fixed` are rejected
//! with [`SchemaError::UnsupportedType`].

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SchemaError;
use crate::schema::{Field, LogicalType, RecordType, Schema, Type};

/// Parse an Avro schema from a JSON string.
///
/// # Example
/// ```
/// use avroframe::schema::{parse_schema, Type};
///
/// let schema = parse_schema(r#"{"type":"record","name":"T","fields":[{"name":"a","type":"long"}]}"#).unwrap();
/// assert_eq!(schema.fullname(), Some("T"));
/// assert_eq!(schema.as_record().unwrap().fields[0].ty, Type::Long);
/// ```
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    parse_schema_with_options(json, false)
}

/// Parse an Avro schema from a JSON string with validation options.
///
/// In strict mode union rule violations (duplicate branches, nested unions)
/// and invalid names fail parsing. In permissive mode they are logged and
/// parsing continues.
pub fn parse_schema_with_options(json: &str, strict: bool) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;

    let mut parser = SchemaParser::new().with_strict(strict);
    Ok(Schema::new(parser.parse(&value)?))
}

/// Schema parser with named record resolution.
///
/// Records are registered under their fully qualified name as soon as they
/// are parsed, so later fields may refer to them by name. A reference to a
/// record still being parsed becomes a [`Type::Named`].
#[derive(Debug, Default)]
pub struct SchemaParser {
    named_types: HashMap<String, Type>,
    in_progress: HashSet<String>,
    current_namespace: Option<String>,
    strict_schema: bool,
}

impl SchemaParser {
    /// Create a new parser in permissive mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to use strict schema validation.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Parse a JSON value into a type.
    pub fn parse(&mut self, value: &Value) -> Result<Type, SchemaError> {
        match value {
            Value::String(s) => self.parse_string_schema(s),
            Value::Object(obj) => self.parse_object_schema(obj),
            Value::Array(arr) => self.parse_union_schema(arr),
            _ => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {}",
                value
            ))),
        }
    }

    fn parse_string_schema(&self, s: &str) -> Result<Type, SchemaError> {
        if let Some(primitive) = primitive(s) {
            return Ok(primitive);
        }
        self.lookup_named(s)
    }

    fn parse_object_schema(&mut self, obj: &Map<String, Value>) -> Result<Type, SchemaError> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        let base = match type_value {
            Value::String(s) => match s.as_str() {
                "record" => return self.parse_record_schema(obj),
                "enum" | "array" | "map" | "fixed" => {
                    return Err(SchemaError::UnsupportedType(s.clone()))
                }
                other => match primitive(other) {
                    Some(p) => p,
                    None => self.lookup_named(other)?,
                },
            },
            // {"type": {...}} or {"type": [...]} wraps another schema
            nested => self.parse(nested)?,
        };

        match obj.get("logicalType") {
            Some(logical) => {
                let name = logical.as_str().ok_or_else(|| {
                    SchemaError::InvalidSchema("logicalType must be a string".to_string())
                })?;
                let mut logical_type = LogicalType::new(base, name);
                for (key, value) in obj {
                    if key != "type" && key != "logicalType" {
                        logical_type.properties.insert(key.clone(), value.clone());
                    }
                }
                Ok(Type::Logical(logical_type))
            }
            None => Ok(base),
        }
    }

    fn parse_union_schema(&mut self, arr: &[Value]) -> Result<Type, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }

        let branches = arr
            .iter()
            .map(|v| self.parse(v))
            .collect::<Result<Vec<_>, _>>()?;

        self.validate_union(&branches)?;

        Ok(Type::Union(branches))
    }

    fn parse_record_schema(&mut self, obj: &Map<String, Value>) -> Result<Type, SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Record missing 'name' field".to_string()))?;

        let (name, namespace) = match raw_name.rsplit_once('.') {
            Some((ns, short)) => (short.to_string(), Some(ns.to_string())),
            None => (
                raw_name.to_string(),
                obj.get("namespace")
                    .and_then(|v| v.as_str())
                    .filter(|ns| !ns.is_empty())
                    .map(String::from)
                    .or_else(|| self.current_namespace.clone()),
            ),
        };
        self.validate_name(&name, "Record")?;

        let fields_value = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                SchemaError::InvalidSchema("Record missing 'fields' array".to_string())
            })?;

        let fullname = match &namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => name.clone(),
        };
        self.in_progress.insert(fullname.clone());
        let prev_namespace = std::mem::replace(&mut self.current_namespace, namespace.clone());
        let fields = fields_value
            .iter()
            .map(|f| self.parse_field(f))
            .collect::<Result<Vec<_>, _>>();
        self.current_namespace = prev_namespace;
        self.in_progress.remove(&fullname);

        let record = RecordType {
            name,
            namespace,
            fields: fields?,
        };
        let ty = Type::Record(record);
        self.named_types.insert(fullname, ty.clone());
        Ok(ty)
    }

    fn parse_field(&mut self, value: &Value) -> Result<Field, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?;
        self.validate_name(name, "Field")?;

        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'type'".to_string()))?;

        Ok(Field::new(name, self.parse(type_value)?))
    }

    fn lookup_named(&self, name: &str) -> Result<Type, SchemaError> {
        let fullname = match (&self.current_namespace, name.contains('.')) {
            (Some(ns), false) => format!("{}.{}", ns, name),
            _ => name.to_string(),
        };
        if let Some(ty) = self
            .named_types
            .get(&fullname)
            .or_else(|| self.named_types.get(name))
        {
            return Ok(ty.clone());
        }
        [fullname, name.to_string()]
            .into_iter()
            .find(|candidate| self.in_progress.contains(candidate))
            .map(Type::Named)
            .ok_or_else(|| SchemaError::UnsupportedType(format!("Unknown type: {}", name)))
    }

    /// Avro names start with [A-Za-z_] and contain only [A-Za-z0-9_].
    fn validate_name(&self, name: &str, context: &str) -> Result<(), SchemaError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if valid {
            return Ok(());
        }
        self.violation(format!("{} name '{}' is not a valid Avro name", context, name))
    }

    fn validate_union(&self, branches: &[Type]) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (i, branch) in branches.iter().enumerate() {
            if matches!(branch, Type::Union(_)) {
                self.violation(format!("Union contains nested union at position {}", i))?;
            }
            let key = match branch {
                Type::Record(r) => format!("record:{}", r.fullname()),
                Type::Named(fullname) => format!("record:{}", fullname),
                other => other.type_name().to_string(),
            };
            if !seen.insert(key.clone()) {
                self.violation(format!(
                    "Union contains duplicate type '{}' at position {}",
                    key, i
                ))?;
            }
        }
        Ok(())
    }

    fn violation(&self, msg: String) -> Result<(), SchemaError> {
        if self.strict_schema {
            Err(SchemaError::InvalidSchema(msg))
        } else {
            warn!(message = %msg, "Schema rule violation");
            Ok(())
        }
    }
}

fn primitive(name: &str) -> Option<Type> {
    Some(match name {
        "null" => Type::Null,
        "boolean" => Type::Boolean,
        "int" => Type::Int,
        "long" => Type::Long,
        "float" => Type::Float,
        "double" => Type::Double,
        "bytes" => Type::Bytes,
        "string" => Type::String,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_schema(r#""null""#).unwrap().root(), &Type::Null);
        assert_eq!(parse_schema(r#""int""#).unwrap().root(), &Type::Int);
        assert_eq!(parse_schema(r#"{"type": "long"}"#).unwrap().root(), &Type::Long);
    }

    #[test]
    fn test_parse_logical() {
        let schema = parse_schema(r#"{"type": "bytes", "logicalType": "decimal"}"#).unwrap();
        assert_eq!(
            schema.root(),
            &Type::Logical(LogicalType::new(Type::Bytes, "decimal"))
        );
    }

    #[test]
    fn test_parse_union() {
        let schema = parse_schema(r#"["null", "int"]"#).unwrap();
        assert_eq!(schema.root(), &Type::nullable(Type::Int));
    }

    #[test]
    fn test_parse_record_with_namespace() {
        let schema = parse_schema(
            r#"{
                "type": "record",
                "name": "Sample",
                "namespace": "com.example",
                "fields": [
                    {"name": "str", "type": "string"},
                    {"name": "num3", "type": ["null", "int"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.fullname(), Some("com.example.Sample"));
        let record = schema.as_record().unwrap();
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[1].ty, Type::nullable(Type::Int));
    }

    #[test]
    fn test_dotted_name_sets_namespace() {
        let schema =
            parse_schema(r#"{"type": "record", "name": "a.b.C", "fields": []}"#).unwrap();
        let record = schema.as_record().unwrap();
        assert_eq!(record.name, "C");
        assert_eq!(record.namespace.as_deref(), Some("a.b"));
    }

    #[test]
    fn test_named_reference_resolves_earlier_record() {
        let schema = parse_schema(
            r#"{
                "type": "record", "name": "Outer", "namespace": "ns",
                "fields": [
                    {"name": "a", "type": {"type": "record", "name": "Inner", "fields": []}},
                    {"name": "b", "type": "Inner"}
                ]
            }"#,
        )
        .unwrap();
        let record = schema.as_record().unwrap();
        assert_eq!(record.fields[0].ty, record.fields[1].ty);
    }

    #[test]
    fn test_self_reference_becomes_named() {
        let schema = parse_schema(
            r#"{
                "type": "record", "name": "Node", "namespace": "list",
                "fields": [
                    {"name": "value", "type": "long"},
                    {"name": "next", "type": ["null", "Node"]}
                ]
            }"#,
        )
        .unwrap();
        let record = schema.as_record().unwrap();
        assert_eq!(
            record.fields[1].ty,
            Type::nullable(Type::Named("list.Node".to_string()))
        );
    }

    #[test]
    fn test_logical_over_nested_type() {
        let schema = parse_schema(
            r#"{"type": {"type": "long"}, "logicalType": "timestamp-millis"}"#,
        )
        .unwrap();
        assert_eq!(
            schema.root(),
            &Type::Logical(LogicalType::new(Type::Long, "timestamp-millis"))
        );
        assert_eq!(
            parse_schema(r#"{"type": {"type": "long"}}"#).unwrap().root(),
            &Type::Long
        );
    }

    #[test]
    fn test_unsupported_types_rejected() {
        for json in [
            r#"{"type": "array", "items": "int"}"#,
            r#"{"type": "map", "values": "int"}"#,
            r#"{"type": "enum", "name": "E", "symbols": ["A"]}"#,
            r#""Unknown""#,
        ] {
            assert!(
                matches!(parse_schema(json), Err(SchemaError::UnsupportedType(_))),
                "{} should be unsupported",
                json
            );
        }
    }

    #[test]
    fn test_strict_union_rules() {
        assert!(parse_schema_with_options(r#"["int", "int"]"#, false).is_ok());
        assert!(matches!(
            parse_schema_with_options(r#"["int", "int"]"#, true),
            Err(SchemaError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_schema("{not json"),
            Err(SchemaError::ParseError(_))
        ));
        assert!(matches!(
            parse_schema("[]"),
            Err(SchemaError::InvalidSchema(_))
        ));
    }
}
