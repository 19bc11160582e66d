//! Alternate text formats
//!
//! A [`FormatAdapter`] wraps an optional [`TextFormat`]. When no codec is
//! available for the requested format, encode and decode fail with
//! `SCHEMA_FORMAT_UNSUPPORTED` instead of producing output.

#[cfg(feature = "yaml")]
mod yaml;

#[cfg(feature = "yaml")]
pub use yaml::YamlFormat;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::codec::{self, Tree};
use crate::record::Record;
use crate::schema::{Schema, SchemaError, SchemaResult};

/// Text format errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot render {format}: {reason}")]
    Render { format: &'static str, reason: String },

    #[error("cannot parse {format}: {reason}")]
    Parse { format: &'static str, reason: String },
}

impl From<FormatError> for SchemaError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Render { format, reason } => SchemaError::encoding(format, reason),
            FormatError::Parse { format, reason } => SchemaError::malformed_input(format, reason),
        }
    }
}

/// A text encoding of the value tree.
pub trait TextFormat: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, tree: &Tree) -> Result<String, FormatError>;

    fn parse(&self, text: &str) -> Result<Tree, FormatError>;
}

/// Encodes and decodes records through an optional text codec.
#[derive(Debug, Clone)]
pub struct FormatAdapter {
    requested: String,
    codec: Option<Arc<dyn TextFormat>>,
}

impl FormatAdapter {
    /// Adapter backed by `codec`
    pub fn new(codec: impl TextFormat + 'static) -> Self {
        Self {
            requested: codec.name().to_string(),
            codec: Some(Arc::new(codec)),
        }
    }

    /// Adapter with no codec for `format`
    pub fn unavailable(format: impl Into<String>) -> Self {
        Self {
            requested: format.into(),
            codec: None,
        }
    }

    /// The default alternate format, if this build carries one
    pub fn detect() -> Self {
        Self::by_name("yaml")
    }

    /// Looks up a codec by format name.
    pub fn by_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Self::new(YamlFormat),
            other => {
                tracing::warn!(format = other, "no codec available for text format");
                Self::unavailable(other)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.codec.is_some()
    }

    /// Name of the requested format
    pub fn format_name(&self) -> &str {
        &self.requested
    }

    fn codec(&self) -> SchemaResult<&Arc<dyn TextFormat>> {
        self.codec
            .as_ref()
            .ok_or_else(|| SchemaError::format_unsupported(&self.requested))
    }

    /// Encodes a record as text in this adapter's format.
    pub fn text_encode(&self, record: &Record) -> SchemaResult<String> {
        let text_format = self.codec()?;
        Ok(text_format.render(&codec::encode(record))?)
    }

    /// Decodes text in this adapter's format into a record of `schema`.
    pub fn text_decode(&self, schema: &Arc<Schema>, text: &str) -> SchemaResult<Record> {
        let tree = self.codec()?.parse(text)?;
        codec::decode(schema, &tree)
    }
}

impl Default for FormatAdapter {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{map_of, SchemaErrorCode, Validator};

    /// One `key=value` pair per line; strings only.
    #[derive(Debug)]
    struct LineFormat;

    impl TextFormat for LineFormat {
        fn name(&self) -> &'static str {
            "lines"
        }

        fn render(&self, tree: &Tree) -> Result<String, FormatError> {
            let map = tree.as_object().ok_or_else(|| FormatError::Render {
                format: "lines",
                reason: "not an object".to_string(),
            })?;
            let mut out = String::new();
            for (key, value) in map {
                let text = value.as_str().ok_or_else(|| FormatError::Render {
                    format: "lines",
                    reason: format!("{} is not a string", key),
                })?;
                out.push_str(&format!("{}={}\n", key, text));
            }
            Ok(out)
        }

        fn parse(&self, text: &str) -> Result<Tree, FormatError> {
            let mut map = serde_json::Map::new();
            for line in text.lines() {
                let (key, value) = line.split_once('=').ok_or_else(|| FormatError::Parse {
                    format: "lines",
                    reason: format!("no '=' in {:?}", line),
                })?;
                map.insert(key.to_string(), Tree::String(value.to_string()));
            }
            Ok(Tree::Object(map))
        }
    }

    fn label_schema() -> Arc<Schema> {
        Schema::builder("Label")
            .field("text", Validator::string())
            .field("lang", Validator::string())
            .shared()
    }

    #[test]
    fn test_custom_codec_round_trip() {
        let schema = label_schema();
        let adapter = FormatAdapter::new(LineFormat);
        let record =
            Record::new(Arc::clone(&schema), map_of([("text", "hi"), ("lang", "en")])).unwrap();

        let text = adapter.text_encode(&record).unwrap();
        assert_eq!(text, "text=hi\nlang=en\n");
        assert_eq!(adapter.text_decode(&schema, &text).unwrap(), record);
    }

    #[test]
    fn test_parse_error_is_malformed_input() {
        let adapter = FormatAdapter::new(LineFormat);
        let err = adapter.text_decode(&label_schema(), "garbage").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedInput);
    }

    #[test]
    fn test_unavailable_codec() {
        let schema = label_schema();
        let adapter = FormatAdapter::unavailable("hipack");
        assert!(!adapter.is_available());

        let record =
            Record::new(Arc::clone(&schema), map_of([("text", "hi"), ("lang", "en")])).unwrap();
        let err = adapter.text_encode(&record).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FormatUnsupported);
        assert_eq!(err.message(), "format unsupported: no hipack codec available");

        let err = adapter.text_decode(&schema, "text=hi").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FormatUnsupported);
    }

    #[test]
    fn test_unknown_name_is_unavailable() {
        let adapter = FormatAdapter::by_name("toml");
        assert!(!adapter.is_available());
        assert_eq!(adapter.format_name(), "toml");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_detect_finds_yaml() {
        let adapter = FormatAdapter::detect();
        assert!(adapter.is_available());
        assert_eq!(adapter.format_name(), "yaml");
        assert!(FormatAdapter::by_name("YML").is_available());
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn test_detect_without_yaml() {
        assert!(!FormatAdapter::detect().is_available());
    }
}
