pub mod batch;
pub mod config;
pub mod error;
pub mod rename_engine;
pub mod rule_set;
pub mod rules;
pub mod tui;

pub use rename_engine::{apply_all_rules, apply_all_rules_with_report, apply_rule, RenameEngine};
pub use rules::{Rule, RuleId, RuleKind, RuleType};
