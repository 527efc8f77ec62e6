//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_uint(&self, section: &str, key: &str) -> Result<Option<u64>, String> {
        self.config.getuint(section, key)
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String> {
        match self.config.get(section, key) {
            None => Ok(None),
            Some(raw) => Self::parse_bool(&raw)
                .map(Some)
                .ok_or_else(|| format!("expected a boolean, found '{}'", raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[validator]
strict = true
max_depth = 64
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_uint("validator", "max_depth"), Ok(Some(64)));
        assert_eq!(adapter.get_bool("validator", "strict"), Ok(Some(true)));
    }

    #[test]
    fn missing_section_is_none() {
        let adapter = FileConfigAdapter::from_string("[validator]\nstrict = true\n").unwrap();
        assert_eq!(adapter.get_bool("other", "strict"), Ok(None));
        assert_eq!(adapter.get_uint("other", "max_depth"), Ok(None));
    }

    #[test]
    fn get_uint_returns_value() {
        let adapter = FileConfigAdapter::from_string("[validator]\nmax_depth = 32\n").unwrap();
        assert_eq!(adapter.get_uint("validator", "max_depth"), Ok(Some(32)));
    }

    #[test]
    fn get_uint_missing_is_none() {
        let adapter = FileConfigAdapter::from_string("[validator]\n").unwrap();
        assert_eq!(adapter.get_uint("validator", "max_depth"), Ok(None));
    }

    #[test]
    fn get_uint_rejects_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[validator]\nmax_depth = abc\n").unwrap();
        assert!(adapter.get_uint("validator", "max_depth").is_err());
    }

    #[test]
    fn get_uint_rejects_negative() {
        let adapter = FileConfigAdapter::from_string("[validator]\nmax_depth = -4\n").unwrap();
        assert!(adapter.get_uint("validator", "max_depth").is_err());
    }

    #[test]
    fn get_bool_true_values() {
        let adapter =
            FileConfigAdapter::from_string("[validator]\na = true\nb = yes\nc = 1\nd = ON\n")
                .unwrap();
        for key in ["a", "b", "c", "d"] {
            assert_eq!(adapter.get_bool("validator", key), Ok(Some(true)), "{key}");
        }
    }

    #[test]
    fn get_bool_false_values() {
        let adapter =
            FileConfigAdapter::from_string("[validator]\na = false\nb = no\nc = 0\n").unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(adapter.get_bool("validator", key), Ok(Some(false)), "{key}");
        }
    }

    #[test]
    fn get_bool_rejects_garbage() {
        let adapter = FileConfigAdapter::from_string("[validator]\nstrict = maybe\n").unwrap();
        let err = adapter.get_bool("validator", "strict").unwrap_err();
        assert!(err.contains("maybe"));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[validator]\nallow_empty_branches = false\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_bool("validator", "allow_empty_branches"),
            Ok(Some(false))
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/tradelang.ini");
        assert!(result.is_err());
    }
}
