//! YAML codec

use super::{FormatError, TextFormat};
use crate::codec::Tree;

/// YAML through `serde_yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl TextFormat for YamlFormat {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn render(&self, tree: &Tree) -> Result<String, FormatError> {
        serde_yaml::to_string(tree).map_err(|e| FormatError::Render {
            format: "yaml",
            reason: e.to_string(),
        })
    }

    fn parse(&self, text: &str) -> Result<Tree, FormatError> {
        serde_yaml::from_str(text).map_err(|e| FormatError::Parse {
            format: "yaml",
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_keeps_key_order() {
        let tree = json!({"name": "Ada", "age": 36, "tags": ["a", "b"]});
        let text = YamlFormat.render(&tree).unwrap();
        assert_eq!(text, "name: Ada\nage: 36\ntags:\n- a\n- b\n");
    }

    #[test]
    fn test_parse_numbers() {
        let tree = YamlFormat.parse("x: 1.0\ny: 2\n").unwrap();
        assert_eq!(tree, json!({"x": 1.0, "y": 2}));
        assert!(tree["x"].is_f64());
        assert!(tree["y"].is_i64());
    }

    #[test]
    fn test_parse_error() {
        let err = YamlFormat.parse("x: [1, 2").unwrap_err();
        assert!(matches!(err, FormatError::Parse { format: "yaml", .. }));
    }
}
