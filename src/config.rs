//! Codec configuration
//!
//! Output options for the JSON writer, the alternate text format and the
//! timestamp rendering used by validators built from configuration. Every
//! field has a default, so an empty JSON object is a complete config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::FormatAdapter;
use crate::schema::{SchemaError, SchemaResult, TimestampFormat, Validator};

/// JSON writer options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFormat {
    /// Sort object keys lexicographically (default: false, schema order)
    #[serde(default)]
    pub sort_keys: bool,

    /// Spaces per indentation level; compact when unset
    #[serde(default)]
    pub indent: Option<usize>,
}

impl JsonFormat {
    /// Compact output with sorted keys
    pub fn sorted() -> Self {
        Self {
            sort_keys: true,
            ..Default::default()
        }
    }

    /// Indented output in schema order
    pub fn pretty(width: usize) -> Self {
        Self {
            indent: Some(width),
            ..Default::default()
        }
    }
}

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// JSON writer options
    #[serde(default)]
    pub json: JsonFormat,

    /// Alternate text format name (default: "yaml")
    #[serde(default = "default_text_format")]
    pub text_format: String,

    /// Timestamp output shape (default: iso8601)
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
}

fn default_text_format() -> String {
    "yaml".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            json: JsonFormat::default(),
            text_format: default_text_format(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl CodecConfig {
    /// Loads configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SchemaError::invalid_definition(format!(
                "cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), text_format = %config.text_format, "loaded codec config");
        Ok(config)
    }

    /// Parses configuration from JSON text
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SchemaError::invalid_definition(format!("invalid codec config: {}", e)))
    }

    /// Adapter for the configured text format
    pub fn format_adapter(&self) -> FormatAdapter {
        FormatAdapter::by_name(&self.text_format)
    }

    /// Timestamp validator rendering in the configured format
    pub fn timestamp_validator(&self) -> Validator {
        Validator::timestamp_with(self.timestamp_format)
    }
}
