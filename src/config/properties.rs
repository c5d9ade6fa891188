//! `key=value` properties file.
//!
//! Keys and values are trimmed. Lines without `=`, blank lines, and lines
//! starting with `#` or `!` are ignored. A key with an empty value is an
//! error so a half-edited file is caught at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::RelayError;

pub const ROUTER_FILE: &str = "default_routerFile";
pub const PORT: &str = "default_port";
pub const CALLBACK_KEY: &str = "default_callbackKey";
pub const FORWARD_URL: &str = "default_forward_url";

pub const DEFAULT_PATH: &str = "conf.properties";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn parse(content: &str, path: &Path) -> Result<Self, RelayError> {
        let mut values = HashMap::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = value.trim();
            if value.is_empty() {
                return Err(RelayError::PropertiesParse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    message: format!("'{key}' must not be empty"),
                });
            }
            values.insert(key.to_string(), value.to_string());
        }

        Ok(Self { values })
    }

    /// Load from `path`. When the path was not given explicitly a missing
    /// file yields empty properties so flags alone can configure the relay.
    pub async fn load(path: Option<&Path>) -> Result<Self, RelayError> {
        let (path, explicit) = path.map_or_else(
            || (PathBuf::from(DEFAULT_PATH), false),
            |p| (p.to_path_buf(), true),
        );

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::info!(path = %path.display(), "loaded properties");
                Self::parse(&content, &path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if explicit {
                    Err(RelayError::PropertiesNotFound { path })
                } else {
                    tracing::debug!(path = %path.display(), "no properties file, using flags only");
                    Ok(Self::default())
                }
            }
            Err(e) => Err(RelayError::Io(e)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Properties, RelayError> {
        Properties::parse(content, Path::new("test.properties"))
    }

    #[test]
    fn parses_trimmed_pairs() {
        let props = parse("default_port = 8080\n  default_callbackKey=abc=def \n").unwrap();
        assert_eq!(props.get(PORT), Some("8080"));
        assert_eq!(props.get(CALLBACK_KEY), Some("abc=def"));
    }

    #[test]
    fn ignores_comments_and_noise() {
        let props = parse("# comment = x\n! other = y\n\njust text\n=orphan\nk=v").unwrap();
        assert_eq!(props.get("k"), Some("v"));
        assert_eq!(props.get("# comment"), None);
        assert_eq!(props.get(""), None);
    }

    #[test]
    fn empty_value_is_an_error() {
        let err = parse("default_port=8080\ndefault_forward_url=  \n").unwrap_err();
        match err {
            RelayError::PropertiesParse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains(FORWARD_URL));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn later_keys_override_earlier() {
        let props = parse("k=1\nk=2").unwrap();
        assert_eq!(props.get("k"), Some("2"));
    }

    #[tokio::test]
    async fn missing_default_file_is_tolerated() {
        // Relies on no conf.properties in the crate root during tests.
        let props = Properties::load(None).await.unwrap();
        assert_eq!(props, Properties::default());
    }

    #[tokio::test]
    async fn missing_explicit_file_is_an_error() {
        let err = Properties::load(Some(Path::new("does/not/exist.properties")))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::PropertiesNotFound { .. }));
    }
}
