//! Codec Round-Trip Tests
//!
//! Tests for the serialization boundary:
//! - decode(encode(r)) == r for lossless schemas
//! - JSON text options (order, sorting, indentation)
//! - Alternate text format and its unavailable state
//! - Library types survive the trip in their serialized form

use std::sync::Arc;

use aeroschema::codec::{self, Tree};
use aeroschema::schema::{
    map_of, EnumType, Schema, SchemaErrorCode, Timestamp, TimestampFormat, Validator, Value,
};
use aeroschema::{CodecConfig, FormatAdapter, JsonFormat, Record, Schemed};
use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

aeroschema::schemed! {
    /// Postal address
    pub struct Address => Schema::builder("Address")
        .field("street", Validator::string())
        .field("city", Validator::string())
        .build();
}

aeroschema::schemed! {
    /// Customer profile with library-typed fields
    pub struct Customer => Schema::builder("Customer")
        .field("id", Validator::uuid())
        .field("name", Validator::string())
        .field("joined", Validator::timestamp())
        .field("addresses", Validator::sequence(Address::validator()))
        .with_default(
            "tier",
            Validator::enumeration(EnumType::of_strings("Tier", ["FREE", "PRO"])),
            "FREE",
        )
        .optional("balance", Validator::float())
        .build();
}

fn sample_tree() -> Tree {
    json!({
        "id": "5c2ddc84-bf99-47d2-a0da-3882b9d788ed",
        "name": "Monty",
        "joined": "1983-05-11T19:35:45+01:00",
        "addresses": [
            {"street": "1 Spam Lane", "city": "Camelot"},
            {"street": "2 Eggs Road", "city": "Swamp Castle"}
        ],
        "tier": "PRO",
        "balance": 12.5
    })
}

fn sample() -> Customer {
    Customer::from_tree(&sample_tree()).unwrap()
}

// =============================================================================
// Tree Round-Trip Tests
// =============================================================================

/// Decoding then encoding reproduces the tree.
#[test]
fn test_tree_round_trip() {
    let customer = sample();
    assert_eq!(customer.to_tree(), sample_tree());
    assert_eq!(Customer::from_tree(&customer.to_tree()).unwrap(), customer);
}

/// Serialized forms decode into library values.
#[test]
fn test_library_values_are_coerced() {
    let customer = sample();
    assert_eq!(
        customer.get("id").and_then(Value::as_uuid),
        Uuid::parse_str("5c2ddc84-bf99-47d2-a0da-3882b9d788ed").ok()
    );

    let joined = customer.get("joined").and_then(Value::as_timestamp).unwrap();
    assert_eq!(joined, &Timestamp::parse("1983-05-11T18:35:45Z").unwrap());

    let addresses = customer.get("addresses").and_then(Value::as_list).unwrap();
    let first = addresses[0].as_record().unwrap();
    assert!(Arc::ptr_eq(first.schema(), &Address::schema()));
}

/// Defaults appear in the encoded tree.
#[test]
fn test_default_is_encoded() {
    let mut tree = sample_tree();
    tree.as_object_mut().unwrap().remove("tier");
    let customer = Customer::from_tree(&tree).unwrap();
    assert_eq!(customer.to_tree()["tier"], json!("FREE"));
}

/// Timestamps re-render in the validator's format.
#[test]
fn test_timestamp_renders_in_configured_format() {
    let schema = Schema::builder("Entry")
        .field("at", Validator::timestamp_with(TimestampFormat::Rfc2822))
        .shared();
    let record = codec::decode(&schema, &json!({"at": "1983-05-11 19:35:45 +01:00"})).unwrap();
    assert_eq!(codec::encode(&record), json!({"at": "Wed, 11 May 1983 19:35:45 +0100"}));
    assert_eq!(codec::decode(&schema, &codec::encode(&record)).unwrap(), record);
}

/// Sub-second instants survive the lossless timestamp formats.
#[test]
fn test_lossless_timestamp_formats_round_trip() {
    for format in [TimestampFormat::Iso8601, TimestampFormat::Rfc2822] {
        let schema = Schema::builder("Entry")
            .field("at", Validator::timestamp_with(format))
            .shared();
        let record =
            Record::new(Arc::clone(&schema), map_of([("at", "1983-05-11T19:35:45.250+01:00")]))
                .unwrap();
        let back = codec::decode(&schema, &codec::encode(&record)).unwrap();
        assert_eq!(back, record, "{} should round-trip", format.name());
    }
}

/// Date-only formats keep the date and lose the time of day.
#[test]
fn test_date_only_timestamp_formats_are_lossy() {
    for format in [TimestampFormat::IsoDate, TimestampFormat::Rfc2822Date] {
        let schema = Schema::builder("Entry")
            .field("at", Validator::timestamp_with(format))
            .shared();
        let record =
            Record::new(Arc::clone(&schema), map_of([("at", "1983-05-11T19:35:45+01:00")]))
                .unwrap();
        let back = codec::decode(&schema, &codec::encode(&record)).unwrap();

        assert_ne!(back, record);
        assert_eq!(
            back.get("at").and_then(Value::as_timestamp),
            Some(&Timestamp::parse("1983-05-11T00:00:00Z").unwrap())
        );
        assert_eq!(codec::encode(&back), codec::encode(&record));
    }
}

fn scalar_schema() -> Arc<Schema> {
    Schema::builder("Scalars")
        .field("flag", Validator::bool())
        .field("count", Validator::int())
        .field("ratio", Validator::float())
        .field("label", Validator::string())
        .field("tags", Validator::sequence(Validator::string()))
        .optional("note", Validator::string())
        .shared()
}

proptest! {
    /// decode(encode(r)) == r through the tree and through JSON text.
    #[test]
    fn round_trip_law(
        flag in any::<bool>(),
        count in any::<i64>(),
        quarters in any::<i32>(),
        label in ".{0,30}",
        tags in prop::collection::vec("[a-z@.]{0,12}", 0..6),
        note in proptest::option::of("[ -~]{0,20}"),
    ) {
        let schema = scalar_schema();
        let mut raw = map_of([
            ("flag", Value::from(flag)),
            ("count", Value::from(count)),
            ("ratio", Value::from(f64::from(quarters) / 4.0)),
            ("label", Value::from(label)),
            ("tags", Value::from(tags)),
        ]);
        if let Some(note) = note {
            raw.insert("note".to_string(), Value::from(note));
        }
        let record = Record::new(Arc::clone(&schema), raw).unwrap();

        let via_tree = codec::decode(&schema, &codec::encode(&record)).unwrap();
        prop_assert_eq!(&via_tree, &record);

        let text = codec::to_json(&record, &JsonFormat::default()).unwrap();
        let via_text = codec::from_json(&schema, &text).unwrap();
        prop_assert_eq!(&via_text, &record);
    }
}

// =============================================================================
// JSON Text Tests
// =============================================================================

/// Every JSON option decodes back to the same record.
#[test]
fn test_json_options_round_trip() {
    let customer = sample();
    for format in [JsonFormat::default(), JsonFormat::sorted(), JsonFormat::pretty(4)] {
        let text = customer.to_json_with(&format).unwrap();
        assert_eq!(Customer::from_json(&text).unwrap(), customer);
    }
}

/// Sorted output orders keys at every depth.
#[test]
fn test_sorted_json_is_recursive() {
    let text = sample().to_json_with(&JsonFormat::sorted()).unwrap();
    assert!(text.starts_with(r#"{"addresses":[{"city":"Camelot","street":"1 Spam Lane"}"#));
}

/// Unparseable text is malformed input, not a validation failure.
#[test]
fn test_malformed_json_text() {
    let err = Customer::from_json("{\"id\": [").unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::MalformedInput);

    let err = Customer::from_json("[]").unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::ValidationFailed);
}

// =============================================================================
// Alternate Format Tests
// =============================================================================

/// YAML text round-trips through the adapter.
#[cfg(feature = "yaml")]
#[test]
fn test_yaml_round_trip() {
    let adapter = FormatAdapter::detect();
    let customer = sample();

    let text = customer.to_text(&adapter).unwrap();
    assert!(text.starts_with("id: 5c2ddc84-bf99-47d2-a0da-3882b9d788ed\nname: Monty\n"));
    assert_eq!(Customer::from_text(&adapter, &text).unwrap(), customer);
}

/// YAML decode validates like JSON decode.
#[cfg(feature = "yaml")]
#[test]
fn test_yaml_decode_validates() {
    let adapter = FormatAdapter::detect();
    let text = "street: 1 Spam Lane\ncity: 42\n";
    let err = Address::from_text(&adapter, text).unwrap_err();
    assert_eq!(err.to_string(), "field 'city': 42 should be instance of string");
}

/// An unavailable format fails without touching JSON operations.
#[test]
fn test_unavailable_format() {
    let config = CodecConfig::from_json_str(r#"{"text_format": "hipack"}"#).unwrap();
    let adapter = config.format_adapter();
    let customer = sample();

    let err = customer.to_text(&adapter).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FormatUnsupported);
    assert!(err.to_string().contains("format unsupported"));

    let err = Customer::from_text(&adapter, "id: x").unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FormatUnsupported);

    assert!(customer.to_json().is_ok());
}
