use crate::rules::{RuleId, RuleType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Episodes,
    Rules,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    ChooseRuleType,
    /// Typing `key=value; ...` parameters. `editing` is set when reparameterizing an existing rule.
    EditParams {
        rule_type: RuleType,
        editing: Option<RuleId>,
    },
}

#[derive(Debug, Default, PartialEq)]
pub struct SessionStats {
    pub total: usize,
    pub changed: usize,
    pub failures: usize,
}
