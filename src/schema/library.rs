//! Library types
//!
//! Nested validators that are backed by a collaborator instead of a user
//! schema. Each one accepts its own validated representation unchanged and
//! coerces the shape it is serialized as (a string, for all three types
//! here) back into it.

use std::fmt;

use uuid::Uuid;

use super::errors::{SchemaError, SchemaResult};
use super::timestamp::{Timestamp, TimestampFormat};
use super::value::Value;

/// A non-schema type usable as a `Nested` validator target.
pub trait LibraryType: fmt::Debug + Send + Sync {
    /// Type name used in error messages
    fn name(&self) -> &str;

    /// Accepts an instance of the type or converts a raw value into one.
    fn coerce(&self, value: &Value) -> SchemaResult<Value>;
}

fn not_instance(value: &Value, name: &str) -> SchemaError {
    SchemaError::validation(format!("{} should be instance of {}", value, name))
}

/// Timestamps parsed by the timestamp collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampType {
    format: TimestampFormat,
}

impl TimestampType {
    /// Timestamps rendered with `format`
    pub fn new(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl LibraryType for TimestampType {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn coerce(&self, value: &Value) -> SchemaResult<Value> {
        match value {
            Value::Timestamp(ts) => Ok(Value::Timestamp(ts.with_format(self.format))),
            Value::Str(text) => Timestamp::parse(text)
                .map(|ts| Value::Timestamp(ts.with_format(self.format)))
                .map_err(|e| {
                    SchemaError::validation(format!("{}({}) raised {}", self.name(), value, e))
                }),
            other => Err(not_instance(other, self.name())),
        }
    }
}

/// UUIDs, hyphenated or simple, any case.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl LibraryType for UuidType {
    fn name(&self) -> &str {
        "uuid"
    }

    fn coerce(&self, value: &Value) -> SchemaResult<Value> {
        match value {
            Value::Uuid(_) => Ok(value.clone()),
            Value::Str(text) => Uuid::parse_str(text).map(Value::Uuid).map_err(|e| {
                SchemaError::validation(format!("{}({}) raised {}", self.name(), value, e))
            }),
            other => Err(not_instance(other, self.name())),
        }
    }
}

/// A named, closed set of scalar members.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    members: Vec<Value>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
        }
    }

    /// Enumeration whose members are strings
    pub fn of_strings<'a>(name: impl Into<String>, members: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(name, members.into_iter().map(Value::from))
    }

    pub fn members(&self) -> &[Value] {
        &self.members
    }
}

impl LibraryType for EnumType {
    fn name(&self) -> &str {
        &self.name
    }

    fn coerce(&self, value: &Value) -> SchemaResult<Value> {
        if self.members.contains(value) {
            Ok(value.clone())
        } else {
            Err(SchemaError::validation(format!(
                "{} is not a valid {}",
                value, self.name
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_from_string() {
        let ty = TimestampType::default();
        let value = ty.coerce(&Value::from("1983-05-11T19:35:45+0100")).unwrap();
        let ts = value.as_timestamp().unwrap();
        assert_eq!(ts.to_text(), "1983-05-11T19:35:45+01:00");
    }

    #[test]
    fn test_timestamp_instance_passes_and_takes_format() {
        let ty = TimestampType::new(TimestampFormat::Rfc2822);
        let ts = Timestamp::now();
        let value = ty.coerce(&Value::Timestamp(ts)).unwrap();
        assert_eq!(value.as_timestamp().unwrap(), &ts);
        assert_eq!(value.as_timestamp().unwrap().format(), TimestampFormat::Rfc2822);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        let ty = TimestampType::default();
        let err = ty.coerce(&Value::from("Blargh")).unwrap_err();
        assert!(err.message().contains("timestamp(\"Blargh\") raised"));

        let err = ty.coerce(&Value::from(12)).unwrap_err();
        assert_eq!(err.message(), "12 should be instance of timestamp");
    }

    #[test]
    fn test_uuid_spellings() {
        let spellings = [
            "5c2ddc84-bf99-47d2-a0da-3882b9d788ed",
            "5C2DDC84-BF99-47D2-A0DA-3882B9D788ED",
            "5c2ddc84bf9947d2a0da3882b9d788ed",
            "5C2DDC84BF9947D2A0DA3882B9D788ED",
        ];
        let expected = Uuid::parse_str(spellings[0]).unwrap();
        for text in spellings {
            let value = UuidType.coerce(&Value::from(text)).unwrap();
            assert_eq!(value.as_uuid(), Some(expected));
        }
    }

    #[test]
    fn test_uuid_rejects_invalid() {
        for text in ["", "blargh", "AFCEDEFSDSDS"] {
            assert!(UuidType.coerce(&Value::from(text)).is_err());
        }
    }

    #[test]
    fn test_uuid_instance_is_unchanged() {
        let id = Uuid::new_v4();
        assert_eq!(UuidType.coerce(&Value::Uuid(id)).unwrap(), Value::Uuid(id));
    }

    #[test]
    fn test_enum_membership() {
        let continent = EnumType::of_strings("Continent", ["EUROPE", "ASIA", "OCEANIA"]);
        assert_eq!(
            continent.coerce(&Value::from("EUROPE")).unwrap(),
            Value::from("EUROPE")
        );

        let err = continent.coerce(&Value::from("ATLANTIS")).unwrap_err();
        assert_eq!(err.message(), "\"ATLANTIS\" is not a valid Continent");
    }
}
