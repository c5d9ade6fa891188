//! `callback-relay validate`: check a routing file for errors.
//!
//! Parses the routing file, compiles every expression, and checks every
//! target URL, reporting results as human-readable text or JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::rules::parse_rules;
use crate::config::validation;
use crate::error::RelayError;

pub fn execute(args: &ValidateArgs) -> Result<(), RelayError> {
    let path = &args.router;

    if !path.exists() {
        return Err(RelayError::RulesFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;
    let rules = parse_rules(&content, path)?;
    let default_url = args.default_url.as_deref();

    if let Err(errors) = validation::validate(&rules, default_url) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "rule": e.rule,
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(RelayError::RulesValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(
                    &path.display().to_string(),
                    &rules,
                    default_url
                )
            );
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "rules": rules.len(),
                    "default": default_url,
                })
            );
        }
    }

    Ok(())
}
