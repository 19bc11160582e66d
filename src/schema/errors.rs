//! Schema error types
//!
//! Every failure inside the validator model, schemas, records and the tree
//! codec surfaces as a single [`SchemaError`]. Callers distinguish failures
//! by message, not by structure; the code only separates validation
//! failures from malformed input text and missing collaborators.
//!
//! Error codes:
//! - SCHEMA_VALIDATION_FAILED
//! - SCHEMA_MALFORMED_INPUT
//! - SCHEMA_FORMAT_UNSUPPORTED
//! - SCHEMA_ENCODING_FAILED
//! - SCHEMA_INVALID_DEFINITION

use std::fmt;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A value does not conform to its validator
    ValidationFailed,
    /// Input text could not be parsed into a value tree
    MalformedInput,
    /// The requested text format has no codec available
    FormatUnsupported,
    /// A value tree could not be written as text
    EncodingFailed,
    /// A schema, validator or configuration could not be built
    InvalidDefinition,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::ValidationFailed => "SCHEMA_VALIDATION_FAILED",
            SchemaErrorCode::MalformedInput => "SCHEMA_MALFORMED_INPUT",
            SchemaErrorCode::FormatUnsupported => "SCHEMA_FORMAT_UNSUPPORTED",
            SchemaErrorCode::EncodingFailed => "SCHEMA_ENCODING_FAILED",
            SchemaErrorCode::InvalidDefinition => "SCHEMA_INVALID_DEFINITION",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One step of the location of a failure inside a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A record field or mapping key
    Field(String),
    /// A sequence position
    Index(usize),
}

/// Schema error with its location inside the validated value
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Outermost segment first
    path: Vec<PathSegment>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Create a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::ValidationFailed, message)
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::validation("missing required field").at_field(field)
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::validation("unknown field").at_field(field)
    }

    /// Create an error listing undeclared keys, sorted for determinism
    pub fn unexpected_keys<'a>(what: &str, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys: Vec<&str> = keys.into_iter().collect();
        keys.sort_unstable();
        let listed = keys
            .iter()
            .map(|k| format!("'{}'", k))
            .collect::<Vec<_>>()
            .join(", ");
        Self::validation(format!("unexpected {}: {}", what, listed))
    }

    /// Create a malformed input error (unparseable JSON or text)
    pub fn malformed_input(format: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::MalformedInput,
            format!("invalid {} input: {}", format, reason),
        )
    }

    /// Create a format unsupported error
    pub fn format_unsupported(format: &str) -> Self {
        Self::new(
            SchemaErrorCode::FormatUnsupported,
            format!("format unsupported: no {} codec available", format),
        )
    }

    /// Create an encoding error
    pub fn encoding(format: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::EncodingFailed,
            format!("cannot write {}: {}", format, reason),
        )
    }

    /// Create an invalid definition error
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::InvalidDefinition, reason)
    }

    /// Prefixes the path with a field name.
    pub fn at_field(mut self, field: impl Into<String>) -> Self {
        self.path.insert(0, PathSegment::Field(field.into()));
        self
    }

    /// Prefixes the path with a sequence index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message, without location
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the location segments, outermost first
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Returns the location rendered as `name.first` or `emails[1]`.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(i) => {
                    out.push_str(&format!("[{}]", i));
                }
            }
        }
        out
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "field '{}': {}", self.path_string(), self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
