//! JSON file document adapter.

use crate::domain::error::TradelangError;
use crate::ports::document_port::DocumentPort;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct JsonDocumentAdapter;

impl JsonDocumentAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parses without serde_json's fixed nesting limit; the validator's
    /// depth budget is the only bound on how deep a document may go.
    pub fn parse(source_name: &str, content: &str) -> Result<Value, TradelangError> {
        let parse_error = |e: serde_json::Error| TradelangError::DocumentParse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        };
        let mut de = serde_json::Deserializer::from_str(content);
        de.disable_recursion_limit();
        let value =
            Value::deserialize(serde_stacker::Deserializer::new(&mut de)).map_err(parse_error)?;
        de.end().map_err(parse_error)?;
        Ok(value)
    }
}

impl DocumentPort for JsonDocumentAdapter {
    /// A file is returned as-is; a directory yields its `*.json` files sorted
    /// by name (not recursive).
    fn discover(&self, location: &Path) -> Result<Vec<PathBuf>, TradelangError> {
        if !location.is_dir() {
            return Ok(vec![location.to_path_buf()]);
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(location)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn load(&self, path: &Path) -> Result<Value, TradelangError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_valid_json() {
        let value = JsonDocumentAdapter::parse("inline", r#"{"name": "S"}"#).unwrap();
        assert_eq!(value["name"], "S");
    }

    #[test]
    fn parse_invalid_json() {
        let err = JsonDocumentAdapter::parse("broken.json", "{\"name\": ").unwrap_err();
        assert!(matches!(
            err,
            TradelangError::DocumentParse { ref source_name, .. } if source_name == "broken.json"
        ));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn trailing_content_is_rejected() {
        let err = JsonDocumentAdapter::parse("two.json", "{} {}").unwrap_err();
        assert!(matches!(err, TradelangError::DocumentParse { .. }));
    }

    #[test]
    fn nesting_past_serde_default_limit() {
        let depth = 400;
        let content = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let mut value = &JsonDocumentAdapter::parse("deep.json", &content).unwrap();
        let mut levels = 0;
        while let Value::Array(items) = value {
            value = &items[0];
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(value, &serde_json::json!(1));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let value = JsonDocumentAdapter::new().load(file.path()).unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = JsonDocumentAdapter::new()
            .load(Path::new("/nonexistent/strategy.json"))
            .unwrap_err();
        assert!(matches!(err, TradelangError::Io(_)));
    }

    #[test]
    fn discover_single_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let paths = JsonDocumentAdapter::new().discover(file.path()).unwrap();
        assert_eq!(paths, vec![file.path().to_path_buf()]);
    }

    #[test]
    fn discover_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let paths = JsonDocumentAdapter::new().discover(dir.path()).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
