//! Routing file validation with detailed error reporting.
//!
//! The [`validate`] function checks each [`Rule`] for a target URL that
//! is not http(s), an expression that does not compile, and fields that
//! are not part of the callback vocabulary. The default target is checked
//! too when one is set. The server itself tolerates all of these (a bad
//! rule just never matches); `validate` exists to catch them early.

use url::Url;

use super::rules::Rule;
use crate::error::ValidationError;
use crate::expr::{self, Expr};
use crate::relay::payload::FIELD_NAMES;

/// Validate a single target URL. Returns `Ok(())` or a human-readable error.
pub fn validate_target_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(rules: &[Rule], default_target: Option<&str>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(default_target) = default_target.filter(|d| !d.is_empty()) {
        if let Err(msg) = validate_target_url(default_target) {
            errors.push(ValidationError {
                rule: "(default)".into(),
                field: "url".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    for (i, rule) in rules.iter().enumerate() {
        let rule_id = format!("rules[{i}]");

        if let Err(msg) = validate_target_url(&rule.url) {
            errors.push(ValidationError {
                rule: rule_id.clone(),
                field: "url".into(),
                message: msg,
                suggestion: if rule.url.contains("://") {
                    None
                } else {
                    Some(format!("did you mean 'http://{}'?", rule.url))
                },
            });
        }

        match expr::parse(&rule.expression) {
            Ok(parsed) => {
                let mut fields = Vec::new();
                collect_fields(&parsed, &mut fields);
                for name in fields {
                    if !FIELD_NAMES.contains(&name) {
                        errors.push(ValidationError {
                            rule: rule_id.clone(),
                            field: "expression".into(),
                            message: format!("unknown field '{name}'"),
                            suggestion: closest_field(name).map(|f| format!("did you mean '{f}'?")),
                        });
                    }
                }
            }
            Err(e) => {
                errors.push(ValidationError {
                    rule: rule_id.clone(),
                    field: "expression".into(),
                    message: format!("{} at offset {}", e.message, e.offset),
                    suggestion: None,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Format a human-readable summary of a valid routing file.
#[must_use]
pub fn format_validation_report(path: &str, rules: &[Rule], default_target: Option<&str>) -> String {
    use std::fmt::Write;
    let mut report = format!("{path} is valid\n\n");
    for (i, rule) in rules.iter().enumerate() {
        // write! to String is infallible
        let _ = writeln!(report, "  {}. {} \u{2192} {}", i + 1, rule.expression, rule.url);
    }
    match default_target.filter(|d| !d.is_empty()) {
        Some(d) => {
            let _ = writeln!(report, "  default \u{2192} {d}");
        }
        None => report.push_str("  default \u{2192} (none)\n"),
    }
    report
}

fn collect_fields<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Field(name) => out.push(name),
        Expr::Compare { left, right, .. } | Expr::Logical { left, right, .. } => {
            collect_fields(left, out);
            collect_fields(right, out);
        }
        Expr::Unary { operand, .. } => collect_fields(operand, out),
    }
}

fn closest_field(name: &str) -> Option<&'static str> {
    FIELD_NAMES
        .iter()
        .copied()
        .find(|f| f.eq_ignore_ascii_case(name))
}
