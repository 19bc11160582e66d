//! Validator model
//!
//! A `Validator` is a closed tagged union describing which raw values are
//! acceptable and how to produce the validated value. Every variant
//! implements the same operation, [`Validator::validate`], which either
//! returns the validated value or a [`SchemaError`]; there is no partial
//! result and no side effect beyond the returned value.
//!
//! Composition rules:
//! - `And` feeds each stage's output into the next and stops at the first failure
//! - `Or` tries branches left to right; the first success wins
//! - `Use` runs a caller-supplied function; its error is the failure
//! - `Sequence` and `Mapping` attach the failing index or key to the error path

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::errors::{SchemaError, SchemaResult};
use super::library::{EnumType, LibraryType, TimestampType, UuidType};
use super::timestamp::TimestampFormat;
use super::types::Schema;
use super::value::{Map, Value};
use crate::record::Record;

/// Built-in primitive kinds. Matching is exact: no numeric widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    Int,
    Float,
    Bool,
}

impl Kind {
    /// Returns the kind name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
        }
    }

    /// Returns whether `value` is exactly of this kind
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::Str, Value::Str(_))
                | (Kind::Int, Value::Int(_))
                | (Kind::Float, Value::Float(_))
                | (Kind::Bool, Value::Bool(_))
        )
    }
}

type UseFunc = dyn Fn(&Value) -> SchemaResult<Value> + Send + Sync;

/// A named transform or predicate function held by `Validator::Use`.
#[derive(Clone)]
pub struct UseFn {
    name: String,
    func: Arc<UseFunc>,
}

impl UseFn {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> SchemaResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, value: &Value) -> SchemaResult<Value> {
        (self.func)(value)
    }
}

impl fmt::Debug for UseFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UseFn({})", self.name)
    }
}

/// What a `Nested` validator resolves to.
#[derive(Clone)]
pub enum Target {
    /// Records governed by a user schema
    Schema(Arc<Schema>),
    /// A collaborator-backed type (timestamp, UUID, enumeration)
    Library(Arc<dyn LibraryType>),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Schema(schema) => schema.name(),
            Target::Library(ty) => ty.name(),
        }
    }

    fn validate(&self, value: &Value) -> SchemaResult<Value> {
        match self {
            Target::Schema(schema) => match value {
                Value::Record(record) if Arc::ptr_eq(record.schema(), schema) => Ok(value.clone()),
                Value::Map(map) => Record::new(Arc::clone(schema), map.clone()).map(Value::Record),
                other => Err(not_instance(other, schema.name())),
            },
            Target::Library(ty) => ty.coerce(value),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Schema(schema) => write!(f, "Schema({})", schema.name()),
            Target::Library(ty) => write!(f, "Library({:?})", ty),
        }
    }
}

/// One declared key of a `Mapping` validator.
#[derive(Debug, Clone)]
pub struct MapEntry {
    key: String,
    validator: Validator,
    required: bool,
}

impl MapEntry {
    /// Key that must be present
    pub fn required(key: impl Into<String>, validator: Validator) -> Self {
        Self {
            key: key.into(),
            validator,
            required: true,
        }
    }

    /// Key that may be absent; absent keys are left out of the output
    pub fn optional(key: impl Into<String>, validator: Validator) -> Self {
        Self {
            key: key.into(),
            validator,
            required: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A compiled regex plus the pattern it was written as.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`, anchored at the start of the input.
    pub fn new(source: &str) -> SchemaResult<Self> {
        let regex = Regex::new(&format!("^(?:{})", source)).map_err(|e| {
            SchemaError::invalid_definition(format!("invalid regex '{}': {}", source, e))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A validation rule.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Exactly one primitive kind
    Primitive(Kind),
    /// A record governed by another schema, or a library type
    Nested(Target),
    /// Ordered collection; every element satisfies the inner validator
    Sequence(Box<Validator>),
    /// Fixed-shape key/value collection
    Mapping(Vec<MapEntry>),
    /// Every stage in order, each fed the previous output
    And(Vec<Validator>),
    /// First branch that accepts
    Or(Vec<Validator>),
    /// Arbitrary transform or predicate
    Use(UseFn),
    /// Equality with a fixed value
    Literal(Value),
    /// String whose start matches a regex
    Matches(Pattern),
    /// Inner validator with its failure message replaced
    Described(Box<Validator>, String),
}

fn not_instance(value: &Value, expected: &str) -> SchemaError {
    SchemaError::validation(format!("{} should be instance of {}", value, expected))
}

impl Validator {
    pub fn string() -> Self {
        Validator::Primitive(Kind::Str)
    }

    pub fn int() -> Self {
        Validator::Primitive(Kind::Int)
    }

    pub fn float() -> Self {
        Validator::Primitive(Kind::Float)
    }

    pub fn bool() -> Self {
        Validator::Primitive(Kind::Bool)
    }

    /// Records governed by `schema`
    pub fn nested(schema: Arc<Schema>) -> Self {
        Validator::Nested(Target::Schema(schema))
    }

    /// Any collaborator-backed type
    pub fn library(ty: impl LibraryType + 'static) -> Self {
        Validator::Nested(Target::Library(Arc::new(ty)))
    }

    /// Timestamps rendered as ISO 8601
    pub fn timestamp() -> Self {
        Self::library(TimestampType::default())
    }

    /// Timestamps rendered with `format`
    pub fn timestamp_with(format: TimestampFormat) -> Self {
        Self::library(TimestampType::new(format))
    }

    pub fn uuid() -> Self {
        Self::library(UuidType)
    }

    pub fn enumeration(ty: EnumType) -> Self {
        Self::library(ty)
    }

    pub fn sequence(element: Validator) -> Self {
        Validator::Sequence(Box::new(element))
    }

    pub fn mapping(entries: impl IntoIterator<Item = MapEntry>) -> Self {
        Validator::Mapping(entries.into_iter().collect())
    }

    pub fn and(stages: impl IntoIterator<Item = Validator>) -> Self {
        Validator::And(stages.into_iter().collect())
    }

    pub fn or(branches: impl IntoIterator<Item = Validator>) -> Self {
        Validator::Or(branches.into_iter().collect())
    }

    /// Transform whose own `SchemaError` is the failure.
    pub fn using<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> SchemaResult<Value> + Send + Sync + 'static,
    {
        Validator::Use(UseFn::new(name, func))
    }

    /// Transform returning a foreign error, rewrapped as
    /// `"<name>(<value>) raised <error>"`.
    pub fn convert<F, E>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let name = name.into();
        let label = name.clone();
        Self::using(name, move |value| {
            func(value).map_err(|e| {
                SchemaError::validation(format!("{}({}) raised {}", label, value, e))
            })
        })
    }

    /// Boolean check; the value passes through unchanged.
    pub fn predicate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self::using(name, move |value| {
            if func(value) {
                Ok(value.clone())
            } else {
                Err(SchemaError::validation(format!(
                    "{}({}) should evaluate to true",
                    label, value
                )))
            }
        })
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Validator::Literal(value.into())
    }

    pub fn null() -> Self {
        Validator::Literal(Value::Null)
    }

    /// Accepts null (and therefore absence) besides `inner`
    pub fn optional(inner: Validator) -> Self {
        Self::or([inner, Self::null()])
    }

    pub fn matches(pattern: &str) -> SchemaResult<Self> {
        Pattern::new(pattern).map(Validator::Matches)
    }

    /// Replaces any failure of this validator with `message`
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Validator::Described(Box::new(self), message.into())
    }

    /// Whether null is accepted by shape: a null literal, or an `Or` with a
    /// null branch. Used to decide absence without running any validator.
    pub fn admits_null(&self) -> bool {
        match self {
            Validator::Literal(Value::Null) => true,
            Validator::Or(branches) => branches.iter().any(Validator::admits_null),
            Validator::Described(inner, _) => inner.admits_null(),
            _ => false,
        }
    }

    fn is_null_literal(&self) -> bool {
        matches!(self, Validator::Literal(Value::Null))
    }

    /// Matches `value`, producing the validated value.
    pub fn validate(&self, value: &Value) -> SchemaResult<Value> {
        match self {
            Validator::Primitive(kind) => {
                if kind.accepts(value) {
                    Ok(value.clone())
                } else {
                    Err(not_instance(value, kind.name()))
                }
            }
            Validator::Nested(target) => target.validate(value),
            Validator::Sequence(element) => {
                let items = value.as_list().ok_or_else(|| not_instance(value, "list"))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| element.validate(item).map_err(|e| e.at_index(i)))
                    .collect::<SchemaResult<Vec<_>>>()
                    .map(Value::List)
            }
            Validator::Mapping(entries) => validate_mapping(entries, value),
            Validator::And(stages) => {
                let mut current = value.clone();
                for stage in stages {
                    current = stage.validate(&current)?;
                }
                Ok(current)
            }
            Validator::Or(branches) => {
                let mut failures = Vec::with_capacity(branches.len());
                for branch in branches {
                    match branch.validate(value) {
                        Ok(validated) => return Ok(validated),
                        Err(e) => failures.push((branch.is_null_literal(), e)),
                    }
                }
                tracing::trace!(value = %value, attempts = failures.len(), "no alternative matched");

                // A single non-null branch reports its own error, path included.
                let mut substantive = failures
                    .iter()
                    .enumerate()
                    .filter(|(_, (null_branch, _))| !null_branch)
                    .map(|(i, _)| i);
                if let (Some(i), None) = (substantive.next(), substantive.next()) {
                    return Err(failures.swap_remove(i).1);
                }

                let reasons: Vec<String> = failures.iter().map(|(_, e)| e.to_string()).collect();
                Err(SchemaError::validation(format!(
                    "{} did not validate any alternative: {}",
                    value,
                    reasons.join(" | ")
                )))
            }
            Validator::Use(func) => func.call(value),
            Validator::Literal(expected) => {
                if value == expected {
                    Ok(value.clone())
                } else {
                    Err(SchemaError::validation(format!(
                        "{} should be {}",
                        value, expected
                    )))
                }
            }
            Validator::Matches(pattern) => match value {
                Value::Str(text) if pattern.is_match(text) => Ok(value.clone()),
                Value::Str(_) => Err(SchemaError::validation(format!(
                    "{} does not match regex '{}'",
                    value,
                    pattern.source()
                ))),
                other => Err(SchemaError::validation(format!("{} is not a string", other))),
            },
            Validator::Described(inner, message) => inner
                .validate(value)
                .map_err(|_| SchemaError::validation(message.clone())),
        }
    }
}

fn validate_mapping(entries: &[MapEntry], value: &Value) -> SchemaResult<Value> {
    let map = value.as_map().ok_or_else(|| not_instance(value, "map"))?;

    let extra: Vec<&str> = map
        .keys()
        .filter(|k| !entries.iter().any(|e| &e.key == *k))
        .map(String::as_str)
        .collect();
    if !extra.is_empty() {
        return Err(SchemaError::unexpected_keys("keys", extra));
    }

    let mut out = Map::with_capacity(entries.len());
    for entry in entries {
        match map.get(&entry.key) {
            Some(raw) => {
                let validated = entry
                    .validator
                    .validate(raw)
                    .map_err(|e| e.at_field(&entry.key))?;
                out.insert(entry.key.clone(), validated);
            }
            None if entry.required => {
                return Err(SchemaError::validation("missing required key").at_field(&entry.key));
            }
            None => {}
        }
    }

    Ok(Value::Map(out))
}
