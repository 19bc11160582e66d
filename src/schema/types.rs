//! Schema definitions
//!
//! A schema is an ordered mapping from field name to [`Field`]. Declaration
//! order is both validation order and serialization key order. Schemas are
//! built once and then shared read-only behind an `Arc`.

use std::sync::Arc;

use indexmap::IndexMap;

use super::errors::{SchemaError, SchemaResult};
use super::validator::Validator;
use super::value::{Map, Value};

/// Field definition
#[derive(Debug, Clone)]
pub struct Field {
    /// Validator applied to supplied values and to the default
    validator: Validator,
    /// Value used when the field is absent
    default: Option<Value>,
}

impl Field {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            default: None,
        }
    }

    /// Field that takes `default` when absent
    pub fn with_default(validator: Validator, default: impl Into<Value>) -> Self {
        Self {
            validator,
            default: Some(default.into()),
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field may be left out
    pub fn is_optional(&self) -> bool {
        self.default.is_some() || self.validator.admits_null()
    }

    /// Resolves a field with no supplied value.
    ///
    /// A default is validated like a supplied value. Without one, absence is
    /// decided by the validator's shape alone; no validator runs.
    fn resolve_absent(&self, name: &str) -> SchemaResult<Value> {
        match &self.default {
            Some(default) => self
                .validator
                .validate(default)
                .map_err(|e| e.at_field(name)),
            None if self.validator.admits_null() => Ok(Value::Null),
            None => Err(SchemaError::missing_field(name)),
        }
    }
}

impl From<Validator> for Field {
    fn from(validator: Validator) -> Self {
        Field::new(validator)
    }
}

/// Complete schema definition
#[derive(Debug, Clone)]
pub struct Schema {
    /// Record type name used in error messages
    name: String,
    /// Field definitions in declaration order
    fields: IndexMap<String, Field>,
}

impl Schema {
    /// Starts a schema declaration
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a complete set of raw field values.
    ///
    /// Undeclared keys are rejected before any field is looked at. Declared
    /// fields are then validated in declaration order and the first failure
    /// aborts, carrying the field name in its path. The result holds every
    /// declared field, in declaration order.
    pub fn validate_all(&self, raw: &Map) -> SchemaResult<Map> {
        let extra: Vec<&str> = raw
            .keys()
            .filter(|k| !self.fields.contains_key(k.as_str()))
            .map(String::as_str)
            .collect();
        if !extra.is_empty() {
            return Err(SchemaError::unexpected_keys("fields", extra));
        }

        let mut validated = Map::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            let value = match raw.get(name) {
                Some(value) => field
                    .validator
                    .validate(value)
                    .map_err(|e| e.at_field(name))?,
                None => field.resolve_absent(name)?,
            };
            validated.insert(name.clone(), value);
        }

        Ok(validated)
    }

    /// Validates a single field value, for assignment.
    pub fn validate_one(&self, name: &str, raw: &Value) -> SchemaResult<Value> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| SchemaError::unknown_field(name))?;
        field.validator.validate(raw).map_err(|e| e.at_field(name))
    }
}

/// Builder for [`Schema`]
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: IndexMap<String, Field>,
}

impl SchemaBuilder {
    /// Declares a field. Redeclaring a name replaces its definition but
    /// keeps its original position.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Declares a field that may be absent or null
    pub fn optional(self, name: impl Into<String>, validator: Validator) -> Self {
        self.field(name, Validator::optional(validator))
    }

    /// Declares a field that takes `default` when absent
    pub fn with_default(
        self,
        name: impl Into<String>,
        validator: Validator,
        default: impl Into<Value>,
    ) -> Self {
        self.field(name, Field::with_default(validator, default))
    }

    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
        }
    }

    /// Builds straight into a shareable handle
    pub fn shared(self) -> Arc<Schema> {
        Arc::new(self.build())
    }
}
