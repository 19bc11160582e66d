//! JSON text
//!
//! Compact output follows schema field order. Key sorting and indentation
//! are opt-in through [`JsonFormat`].

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::{decode, encode, Tree};
use crate::config::JsonFormat;
use crate::record::Record;
use crate::schema::{Schema, SchemaError, SchemaResult};

/// Encodes a record as JSON text.
pub fn to_json(record: &Record, format: &JsonFormat) -> SchemaResult<String> {
    write_tree(&encode(record), format)
}

/// Decodes JSON text into a record of `schema`.
pub fn from_json(schema: &Arc<Schema>, text: &str) -> SchemaResult<Record> {
    decode(schema, &parse_json(text)?)
}

/// Parses JSON text into a tree.
pub fn parse_json(text: &str) -> SchemaResult<Tree> {
    serde_json::from_str(text).map_err(|e| SchemaError::malformed_input("JSON", e))
}

/// Writes a tree as JSON text.
pub fn write_tree(tree: &Tree, format: &JsonFormat) -> SchemaResult<String> {
    let tree = if format.sort_keys {
        Cow::Owned(sorted(tree))
    } else {
        Cow::Borrowed(tree)
    };

    match format.indent {
        None => serde_json::to_string(tree.as_ref()).map_err(|e| SchemaError::encoding("JSON", e)),
        Some(width) => {
            let indent = vec![b' '; width];
            let mut buf = Vec::new();
            let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
            tree.serialize(&mut ser)
                .map_err(|e| SchemaError::encoding("JSON", e))?;
            String::from_utf8(buf).map_err(|e| SchemaError::encoding("JSON", e))
        }
    }
}

/// Rebuilds objects with their keys in lexicographic order, recursively.
fn sorted(tree: &Tree) -> Tree {
    match tree {
        Tree::Object(map) => {
            let mut entries: Vec<(&String, &Tree)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Tree::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sorted(value)))
                    .collect(),
            )
        }
        Tree::Array(items) => Tree::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
