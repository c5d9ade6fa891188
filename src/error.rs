//! Unified error types for the relay.
//!
//! [`RelayError`] covers startup failures (configuration, routing file,
//! listener) and is reported once before the process exits.
//! [`PipelineError`] covers everything that can go wrong while handling
//! a single callback; each variant maps to an HTTP 500 with a short,
//! non-sensitive body. [`ValidationError`] describes one problem found in
//! a routing file.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub rule: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}: {}", self.rule, self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Properties file not found: {}", path.display())]
    PropertiesNotFound { path: PathBuf },

    #[error("Properties error in {} line {line}: {message}", path.display())]
    PropertiesParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Missing setting '{key}'.\n\n  {hint}")]
    MissingSetting { key: &'static str, hint: String },

    #[error("Invalid value '{value}' for '{key}': {message}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("Routing file not found: {}", path.display())]
    RulesFileNotFound { path: PathBuf },

    #[error("Routing file parse error in {}:\n  {source}", path.display())]
    RulesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Routing file validation failed:\n{}", format_errors(.errors))]
    RulesValidation { errors: Vec<ValidationError> },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one callback somewhere between form extraction and relaying
/// the downstream response.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("payload is not valid URL-encoded data: {0}")]
    MalformedInput(String),

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("payload is not a valid callback record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("forward to {target} failed: {source}")]
    Forward {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("reading response from {target} failed: {source}")]
    ResponseRead {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unexpected fault: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Stable short name used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::InvalidSignature => "invalid_signature",
            Self::Decode(_) => "decode_error",
            Self::Parse(_) => "parse_error",
            Self::Forward { .. } => "forward_error",
            Self::ResponseRead { .. } => "response_read_error",
            Self::Unexpected(_) => "unexpected_fault",
        }
    }

    /// Body written to the caller. Never includes the underlying cause.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "urlDecode error",
            Self::InvalidSignature => "sign error",
            Self::Decode(_) => "base64 decode error",
            Self::Parse(_) => "json Unmarshal error",
            Self::Forward { .. } => "forward error",
            Self::ResponseRead { .. } => "forward error, get resp body error",
            Self::Unexpected(_) => "internal error",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pipeline_error_is_500() {
        let errors = vec![
            PipelineError::MalformedInput("%zz".into()),
            PipelineError::InvalidSignature,
            PipelineError::Unexpected("boom".into()),
            PipelineError::Forward {
                target: "http://a".into(),
                source: "refused".into(),
            },
        ];
        for e in errors {
            assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn public_message_hides_cause() {
        let e = PipelineError::Unexpected("secret internal state".into());
        assert_eq!(e.public_message(), "internal error");
        assert!(!e.public_message().contains("secret"));
    }

    #[test]
    fn validation_error_display_includes_suggestion() {
        let e = ValidationError {
            rule: "rules[0]".into(),
            field: "url".into(),
            message: "not a valid URL".into(),
            suggestion: Some("did you mean 'http://a'?".into()),
        };
        assert_eq!(
            e.to_string(),
            "  rules[0]: url: not a valid URL (did you mean 'http://a'?)"
        );
    }
}
