//! Routing file model and loading.
//!
//! The routing file is a JSON array of `{ "url": ..., "expression": ... }`
//! objects. Array order is rule precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    pub url: String,
    pub expression: String,
}

pub fn parse_rules(content: &str, path: &Path) -> Result<Vec<Rule>, RelayError> {
    serde_json::from_str(content).map_err(|source| RelayError::RulesParse {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn load_rules(path: &Path) -> Result<Vec<Rule>, RelayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelayError::RulesFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelayError::Io(e)
        }
    })?;
    parse_rules(&content, path)
}
