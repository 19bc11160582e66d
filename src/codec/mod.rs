//! Tree codec
//!
//! Converts records to and from the value tree, the JSON-shaped
//! intermediate every text format goes through. Encoding is driven by the
//! runtime shape of each value and never fails; decoding hands the tree to
//! the schema so the validators rebuild nested records, timestamps and
//! UUIDs from their serialized forms.

mod json;

pub use json::{from_json, parse_json, to_json, write_tree};

use std::sync::Arc;

use crate::record::Record;
use crate::schema::{Schema, SchemaError, SchemaResult, Validator, Value};

/// JSON-compatible value tree
pub type Tree = serde_json::Value;

/// Encodes a record as a tree object keyed in schema field order.
pub fn encode(record: &Record) -> Tree {
    Tree::Object(
        record
            .fields()
            .map(|(name, value)| (name.clone(), render(value)))
            .collect(),
    )
}

/// Renders a single value.
///
/// Timestamps become text in their own format, UUIDs their hyphenated
/// form. Non-finite floats have no tree form and render as null.
pub fn render(value: &Value) -> Tree {
    match value {
        Value::Null => Tree::Null,
        Value::Bool(b) => Tree::Bool(*b),
        Value::Int(n) => Tree::from(*n),
        Value::Float(n) => serde_json::Number::from_f64(*n).map_or(Tree::Null, Tree::Number),
        Value::Str(s) => Tree::String(s.clone()),
        Value::List(items) => Tree::Array(items.iter().map(render).collect()),
        Value::Map(map) => Tree::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), render(value)))
                .collect(),
        ),
        Value::Record(record) => encode(record),
        Value::Timestamp(ts) => Tree::String(ts.to_text()),
        Value::Uuid(id) => Tree::String(id.hyphenated().to_string()),
    }
}

/// Converts a tree into raw values, before any validation.
///
/// Integral numbers that fit an `i64` become `Int`, every other number
/// becomes `Float`.
pub fn to_raw(tree: &Tree) -> Value {
    match tree {
        Tree::Null => Value::Null,
        Tree::Bool(b) => Value::Bool(*b),
        Tree::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Tree::String(s) => Value::Str(s.clone()),
        Tree::Array(items) => Value::List(items.iter().map(to_raw).collect()),
        Tree::Object(map) => Value::Map(
            map.iter()
                .map(|(key, value)| (key.clone(), to_raw(value)))
                .collect(),
        ),
    }
}

/// Decodes a tree into a record of `schema`.
pub fn decode(schema: &Arc<Schema>, tree: &Tree) -> SchemaResult<Record> {
    let raw = to_raw(tree);
    match Validator::nested(Arc::clone(schema)).validate(&raw) {
        Ok(Value::Record(record)) => Ok(record),
        Ok(other) => Err(SchemaError::validation(format!(
            "{} should be instance of {}",
            other,
            schema.name()
        ))),
        Err(e) => {
            tracing::debug!(schema = schema.name(), error = %e, "decode rejected");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{map_of, Timestamp, TimestampFormat};
    use serde_json::json;
    use uuid::Uuid;

    fn event_schema() -> Arc<Schema> {
        Schema::builder("Event")
            .field("id", Validator::uuid())
            .field("at", Validator::timestamp_with(TimestampFormat::Rfc2822))
            .field("tags", Validator::sequence(Validator::string()))
            .optional("score", Validator::float())
            .shared()
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&Value::Null), json!(null));
        assert_eq!(render(&Value::from(true)), json!(true));
        assert_eq!(render(&Value::from(3)), json!(3));
        assert_eq!(render(&Value::from(1.5)), json!(1.5));
        assert_eq!(render(&Value::from(f64::NAN)), json!(null));
        assert_eq!(render(&Value::from("a")), json!("a"));
    }

    #[test]
    fn test_render_library_values() {
        let id = Uuid::parse_str("5C2DDC84BF9947D2A0DA3882B9D788ED").unwrap();
        assert_eq!(
            render(&Value::Uuid(id)),
            json!("5c2ddc84-bf99-47d2-a0da-3882b9d788ed")
        );

        let ts = Timestamp::parse("1983-05-11T19:35:45+0100").unwrap();
        assert_eq!(render(&Value::Timestamp(ts)), json!("1983-05-11T19:35:45+01:00"));
    }

    #[test]
    fn test_to_raw_numbers() {
        assert_eq!(to_raw(&json!(7)), Value::Int(7));
        assert_eq!(to_raw(&json!(7.0)), Value::Float(7.0));
        assert_eq!(to_raw(&json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_encode_uses_schema_order_and_formats() {
        let schema = event_schema();
        let record = Record::new(
            Arc::clone(&schema),
            map_of([
                ("tags", Value::from(vec!["a", "b"])),
                ("at", Value::from("1983-05-11T19:35:45+0100")),
                ("id", Value::from("5c2ddc84-bf99-47d2-a0da-3882b9d788ed")),
            ]),
        )
        .unwrap();

        let tree = encode(&record);
        let keys: Vec<&str> = tree.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "at", "tags", "score"]);
        assert_eq!(tree["at"], json!("Wed, 11 May 1983 19:35:45 +0100"));
        assert_eq!(tree["score"], json!(null));
    }

    #[test]
    fn test_decode_round_trip() {
        let schema = event_schema();
        let tree = json!({
            "id": "5c2ddc84-bf99-47d2-a0da-3882b9d788ed",
            "at": "Wed, 11 May 1983 19:35:45 +0100",
            "tags": ["x"],
            "score": 0.5,
        });
        let record = decode(&schema, &tree).unwrap();
        assert_eq!(encode(&record), tree);
        assert_eq!(decode(&schema, &encode(&record)).unwrap(), record);
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let schema = event_schema();
        let err = decode(&schema, &json!([1, 2])).unwrap_err();
        assert!(err.message().contains("should be instance of Event"));
    }

    #[test]
    fn test_decode_error_path() {
        let schema = event_schema();
        let tree = json!({
            "id": "5c2ddc84-bf99-47d2-a0da-3882b9d788ed",
            "at": "1983-05-11",
            "tags": ["x", 3],
        });
        let err = decode(&schema, &tree).unwrap_err();
        assert_eq!(err.path_string(), "tags[1]");
    }
}
