//! Tests for schema parsing and canonical form.

use avroframe::error::SchemaError;
use avroframe::schema::*;

// ============================================================================
// Parser Tests
// ============================================================================

#[test]
fn test_parse_primitive_roots() {
    assert_eq!(parse_schema(r#""long""#).unwrap().root(), &Type::Long);
    assert_eq!(
        parse_schema(r#"{"type": "string"}"#).unwrap().root(),
        &Type::String
    );
    assert_eq!(parse_schema(r#""long""#).unwrap().fullname(), None);
}

#[test]
fn test_parse_record_fields_in_order() {
    let schema = parse_schema(
        r#"{
            "type": "record",
            "name": "Event",
            "namespace": "com.example",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "tag", "type": ["null", "string"], "default": null},
                {"name": "amount", "type": {"type": "bytes", "logicalType": "decimal", "precision": 9, "scale": 2}}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(schema.fullname(), Some("com.example.Event"));
    let record = schema.as_record().unwrap();
    let names: Vec<_> = record.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "tag", "amount"]);
    assert_eq!(record.fields[1].ty, Type::nullable(Type::String));
    match &record.fields[2].ty {
        Type::Logical(logical) => {
            assert_eq!(logical.name, "decimal");
            assert_eq!(*logical.base, Type::Bytes);
            assert_eq!(logical.properties["scale"], 2);
        }
        other => panic!("expected logical type, got {:?}", other),
    }
}

const LINKED_LIST: &str = r#"{
    "type": "record",
    "name": "Node",
    "fields": [
        {"name": "value", "type": "long"},
        {"name": "next", "type": ["null", "Node"]}
    ]
}"#;

#[test]
fn test_self_referencing_record() {
    let schema = parse_schema(LINKED_LIST).unwrap();
    let record = schema.as_record().unwrap();
    assert_eq!(
        record.fields[1].ty,
        Type::nullable(Type::Named("Node".to_string()))
    );

    let reparsed = parse_schema(&schema.canonical_form()).unwrap();
    assert_eq!(reparsed, schema);
}

#[test]
fn test_unknown_reference_still_rejected() {
    assert!(matches!(
        parse_schema(
            r#"{"type": "record", "name": "Node", "fields": [{"name": "next", "type": ["null", "Other"]}]}"#
        ),
        Err(SchemaError::UnsupportedType(_))
    ));
}

#[test]
fn test_logical_annotation_on_nested_type() {
    let schema =
        parse_schema(r#"{"type": {"type": "int"}, "logicalType": "date"}"#).unwrap();
    match schema.root() {
        Type::Logical(logical) => {
            assert_eq!(logical.name, "date");
            assert_eq!(*logical.base, Type::Int);
        }
        other => panic!("expected logical type, got {:?}", other),
    }
}

#[test]
fn test_unsupported_complex_types() {
    for json in [
        r#"{"type": "array", "items": "int"}"#,
        r#"{"type": "map", "values": "int"}"#,
        r#"{"type": "enum", "name": "E", "symbols": ["A"]}"#,
        r#"{"type": "fixed", "name": "F", "size": 4}"#,
    ] {
        assert!(
            matches!(parse_schema(json), Err(SchemaError::UnsupportedType(_))),
            "{}",
            json
        );
    }
}

#[test]
fn test_malformed_documents() {
    assert!(matches!(parse_schema("{"), Err(SchemaError::ParseError(_))));
    assert!(parse_schema(r#"{"type": "record", "name": "R"}"#).is_err());
    assert!(parse_schema("42").is_err());
}

// ============================================================================
// Canonical form
// ============================================================================

#[test]
fn test_canonical_form_round_trips() {
    let original = parse_schema(
        r#"{
            "name": "Event",
            "type": "record",
            "fields": [
                {"type": "long", "name": "id"},
                {"name": "tag", "type": ["null", "string"]},
                {"name": "ts", "type": {"type": "long", "logicalType": "timestamp-millis"}}
            ]
        }"#,
    )
    .unwrap();

    let reparsed = parse_schema(&original.canonical_form()).unwrap();
    assert_eq!(reparsed, original);
    assert_eq!(reparsed.canonical_form(), original.canonical_form());
}

#[test]
fn test_canonical_form_ignores_key_order_and_whitespace() {
    let a = parse_schema(r#"{"type":"record","name":"R","fields":[{"name":"x","type":"int"}]}"#)
        .unwrap();
    let b = parse_schema(
        r#"{ "fields": [ { "type": "int", "name": "x" } ],
             "name": "R", "type": "record" }"#,
    )
    .unwrap();
    assert_eq!(a.canonical_form(), b.canonical_form());
}

#[test]
fn test_built_schema_matches_parsed() {
    let built = Schema::record(
        RecordType::new(
            "User",
            vec![
                Field::new("id", Type::Long),
                Field::new("email", Type::nullable(Type::String)),
            ],
        )
        .with_namespace("acct"),
    );
    let parsed = parse_schema(
        r#"{"type": "record", "name": "User", "namespace": "acct", "fields": [
            {"name": "id", "type": "long"},
            {"name": "email", "type": ["null", "string"]}
        ]}"#,
    )
    .unwrap();
    assert_eq!(built, parsed);
}
