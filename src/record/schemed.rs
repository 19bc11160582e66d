//! Typed record wrappers
//!
//! [`Schemed`] is implemented by newtypes around [`Record`] whose schema is
//! fixed at the type level. The [`schemed!`](crate::schemed) macro declares
//! such a newtype and builds its schema once, on first use.

use std::sync::Arc;

use super::Record;
use crate::codec;
use crate::config::JsonFormat;
use crate::format::FormatAdapter;
use crate::schema::{Map, Schema, SchemaError, SchemaResult, Validator, Value};

/// A record type bound to a single shared schema.
pub trait Schemed: Sized {
    /// The schema every instance is validated against
    fn schema() -> Arc<Schema>;

    /// Wraps an already validated record. The record's schema must be
    /// `Self::schema()`; debug builds assert it. Use [`try_from_record`]
    /// for records of unknown origin.
    ///
    /// [`try_from_record`]: Schemed::try_from_record
    fn from_record(record: Record) -> Self;

    /// Wraps `record` if it is governed by `Self::schema()`
    fn try_from_record(record: Record) -> SchemaResult<Self> {
        let schema = Self::schema();
        if Arc::ptr_eq(record.schema(), &schema) {
            Ok(Self::from_record(record))
        } else {
            Err(SchemaError::validation(format!(
                "{} record should be instance of {}",
                record.schema().name(),
                schema.name()
            )))
        }
    }

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn into_record(self) -> Record;

    /// Validates `fields` into a new instance
    fn new(fields: Map) -> SchemaResult<Self> {
        Record::new(Self::schema(), fields).map(Self::from_record)
    }

    /// A `Nested` validator for this type, for use inside other schemas
    fn validator() -> Validator {
        Validator::nested(Self::schema())
    }

    /// Validates a raw value (an instance or a field map)
    fn validate(value: &Value) -> SchemaResult<Self> {
        match Self::validator().validate(value)? {
            Value::Record(record) => Ok(Self::from_record(record)),
            other => Err(SchemaError::validation(format!(
                "{} should be instance of {}",
                other,
                Self::schema().name()
            ))),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.record().get(name)
    }

    fn set(&mut self, name: &str, value: impl Into<Value>) -> SchemaResult<()> {
        self.record_mut().set(name, value)
    }

    fn update(&mut self, changes: Map) -> SchemaResult<()> {
        self.record_mut().update(changes)
    }

    fn into_value(self) -> Value {
        Value::Record(self.into_record())
    }

    fn to_tree(&self) -> codec::Tree {
        codec::encode(self.record())
    }

    fn from_tree(tree: &codec::Tree) -> SchemaResult<Self> {
        codec::decode(&Self::schema(), tree).map(Self::from_record)
    }

    /// Compact JSON in schema field order
    fn to_json(&self) -> SchemaResult<String> {
        codec::to_json(self.record(), &JsonFormat::default())
    }

    fn to_json_with(&self, format: &JsonFormat) -> SchemaResult<String> {
        codec::to_json(self.record(), format)
    }

    fn from_json(text: &str) -> SchemaResult<Self> {
        codec::from_json(&Self::schema(), text).map(Self::from_record)
    }

    fn to_text(&self, adapter: &FormatAdapter) -> SchemaResult<String> {
        adapter.text_encode(self.record())
    }

    fn from_text(adapter: &FormatAdapter, text: &str) -> SchemaResult<Self> {
        adapter
            .text_decode(&Self::schema(), text)
            .map(Self::from_record)
    }
}

/// Declares a record newtype with a lazily built, shared schema.
///
/// ```
/// use aeroschema::schema::{Schema, Validator};
/// use aeroschema::record::Schemed;
///
/// aeroschema::schemed! {
///     /// A point on the plane
///     pub struct Point => Schema::builder("Point")
///         .field("x", Validator::float())
///         .field("y", Validator::float())
///         .build();
/// }
///
/// let p = Point::from_json(r#"{"x": 1.0, "y": 2.5}"#).unwrap();
/// assert_eq!(p.to_json().unwrap(), r#"{"x":1.0,"y":2.5}"#);
/// ```
///
/// The schema expression runs once. It must not refer to the type being
/// declared.
#[macro_export]
macro_rules! schemed {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $schema:expr;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::record::Record);

        impl $crate::record::Schemed for $name {
            fn schema() -> ::std::sync::Arc<$crate::schema::Schema> {
                static SCHEMA: ::std::sync::OnceLock<::std::sync::Arc<$crate::schema::Schema>> =
                    ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(SCHEMA.get_or_init(|| ::std::sync::Arc::new($schema)))
            }

            fn from_record(record: $crate::record::Record) -> Self {
                debug_assert!(
                    ::std::sync::Arc::ptr_eq(
                        record.schema(),
                        &<Self as $crate::record::Schemed>::schema()
                    ),
                    "{} record wrapped as {}",
                    record.schema().name(),
                    stringify!($name)
                );
                $name(record)
            }

            fn record(&self) -> &$crate::record::Record {
                &self.0
            }

            fn record_mut(&mut self) -> &mut $crate::record::Record {
                &mut self.0
            }

            fn into_record(self) -> $crate::record::Record {
                self.0
            }
        }
    };
}
