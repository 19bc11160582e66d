//! Record instances
//!
//! A `Record` is a validated field map plus the schema that governs it.
//! Construction validates the complete field set; every later write is
//! validated before it lands, and a rejected write leaves the record
//! exactly as it was.

mod schemed;

pub use schemed::Schemed;

use std::fmt;
use std::sync::Arc;

use crate::schema::{Map, Schema, SchemaError, SchemaResult, Value};

/// A validated set of named field values.
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    /// Every declared field, in schema order
    fields: Map,
}

impl Record {
    /// Validates `raw` against `schema`.
    ///
    /// On failure no record is produced.
    pub fn new(schema: Arc<Schema>, raw: Map) -> SchemaResult<Self> {
        match schema.validate_all(&raw) {
            Ok(fields) => Ok(Self { schema, fields }),
            Err(e) => {
                tracing::debug!(schema = schema.name(), error = %e, "record rejected");
                Err(e)
            }
        }
    }

    /// Builds a record from name/value pairs
    pub fn from_pairs<K, V>(
        schema: Arc<Schema>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> SchemaResult<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(schema, crate::schema::map_of(pairs))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the stored value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Fields in schema order
    pub fn fields(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map {
        &self.fields
    }

    pub fn into_map(self) -> Map {
        self.fields
    }

    /// Validates and assigns a single field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> SchemaResult<()> {
        let validated = self
            .schema
            .validate_one(name, &value.into())
            .map_err(|e| self.rejected(e))?;

        if let Some(slot) = self.fields.get_mut(name) {
            *slot = validated;
        }
        Ok(())
    }

    /// Validates and assigns several fields at once; either every change
    /// lands or none does.
    pub fn update(&mut self, changes: Map) -> SchemaResult<()> {
        let mut validated = Vec::with_capacity(changes.len());
        for (name, value) in &changes {
            let value = self
                .schema
                .validate_one(name, value)
                .map_err(|e| self.rejected(e))?;
            validated.push((name.clone(), value));
        }

        for (name, value) in validated {
            if let Some(slot) = self.fields.get_mut(&name) {
                *slot = value;
            }
        }
        Ok(())
    }

    fn rejected(&self, error: SchemaError) -> SchemaError {
        tracing::debug!(schema = self.schema.name(), error = %error, "write rejected");
        error
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.fields == other.fields
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.schema.name())?;
        f.debug_map().entries(self.fields.iter()).finish()
    }
}
