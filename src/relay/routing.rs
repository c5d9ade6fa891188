//! Ordered, first-match-wins rule selection.
//!
//! A [`RuleSet`] holds the routing rules in file order, each with its
//! predicate compiled once at load time. [`select_target`] walks the rules
//! and returns the first target whose predicate is `true`, or the default
//! target. A rule whose predicate failed to compile, fails to evaluate, or
//! is not boolean simply does not match.

use crate::config::rules::Rule;
use crate::expr::{self, Expr};

use super::payload::ParameterMap;

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    pub predicate: Option<Expr>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    default_target: String,
}

impl RuleSet {
    /// Compile every rule's expression. Rules that fail to compile are kept
    /// in position and logged; they never match.
    #[must_use]
    pub fn compile(rules: Vec<Rule>, default_target: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(idx, rule)| {
                let predicate = match expr::parse(&rule.expression) {
                    Ok(expr) => Some(expr),
                    Err(e) => {
                        tracing::warn!(
                            rule = idx,
                            url = %rule.url,
                            error = %e,
                            "rule expression does not compile, rule will never match"
                        );
                        None
                    }
                };
                CompiledRule { rule, predicate }
            })
            .collect();

        Self {
            rules,
            default_target: default_target.into(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    #[must_use]
    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[must_use]
pub fn select_target<'a>(rules: &'a RuleSet, params: &ParameterMap) -> &'a str {
    for (idx, compiled) in rules.rules.iter().enumerate() {
        let Some(predicate) = &compiled.predicate else {
            continue;
        };

        match predicate.matches(params) {
            Ok(true) => {
                tracing::debug!(rule = idx, url = %compiled.rule.url, "rule matched");
                return &compiled.rule.url;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(
                    rule = idx,
                    expression = %compiled.rule.expression,
                    error = %e,
                    "rule evaluation failed, skipping"
                );
            }
        }
    }

    &rules.default_target
}
