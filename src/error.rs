use thiserror::Error;

use crate::rules::{RuleId, RuleType};

/// Raised while editing the rule list. The list is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDefinitionError {
    #[error("{rule_type} rule requires {parameter}")]
    MissingParameter {
        rule_type: RuleType,
        parameter: &'static str,
    },
    #[error("{rule_type} rule has {parameter} out of range ({min}..={max})")]
    OutOfRange {
        rule_type: RuleType,
        parameter: &'static str,
        min: usize,
        max: usize,
    },
    #[error("cannot change rule type from {from} to {to}")]
    TypeChange { from: RuleType, to: RuleType },
    #[error("no rule with id {0}")]
    UnknownRule(RuleId),
    #[error("duplicate rule id {0}")]
    DuplicateId(RuleId),
}

/// Raised while applying a single rule to a single title.
#[derive(Debug, Clone, Error)]
pub enum RuleApplyError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("missing parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("parameter `{0}` is out of range")]
    InvalidParameter(&'static str),
}
