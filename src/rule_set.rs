use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::RuleDefinitionError;
use crate::rules::{DeleteMode, InsertPosition, Rule, RuleId, RuleKind, MAX_SEQUENCE_DIGITS};

/// The ordered rule list of one batch-edit session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    next_id: u64,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            next_id: 1,
        }
    }

    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, RuleDefinitionError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id) {
                return Err(RuleDefinitionError::DuplicateId(rule.id));
            }
        }
        let next_id = rules.iter().map(|r| r.id.0).max().map_or(1, |max| max + 1);
        Ok(Self { rules, next_id })
    }

    /// Reads a JSON array of rules.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules: Vec<Rule> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rules file {}", path.display()))?;
        let set = Self::from_rules(rules)?;
        info!("Loaded {} rules from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn position(&self, id: RuleId) -> Option<usize> {
        self.rules.iter().position(|r| r.id == id)
    }

    /// Appends an enabled rule after checking its required parameters.
    pub fn add(&mut self, kind: RuleKind) -> Result<RuleId, RuleDefinitionError> {
        validate(&kind)?;
        let id = RuleId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.rules.push(Rule::new(id, kind));
        Ok(id)
    }

    pub fn remove(&mut self, id: RuleId) -> Result<Rule, RuleDefinitionError> {
        let pos = self.index_of(id)?;
        Ok(self.rules.remove(pos))
    }

    pub fn set_enabled(&mut self, id: RuleId, enabled: bool) -> Result<(), RuleDefinitionError> {
        let pos = self.index_of(id)?;
        self.rules[pos].enabled = enabled;
        Ok(())
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle(&mut self, id: RuleId) -> Result<bool, RuleDefinitionError> {
        let pos = self.index_of(id)?;
        let rule = &mut self.rules[pos];
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Replaces the parameters of an existing rule. The type cannot change.
    pub fn update(&mut self, id: RuleId, kind: RuleKind) -> Result<(), RuleDefinitionError> {
        let pos = self.index_of(id)?;
        let current = self.rules[pos].rule_type();
        if current != kind.rule_type() {
            return Err(RuleDefinitionError::TypeChange {
                from: current,
                to: kind.rule_type(),
            });
        }
        validate(&kind)?;
        self.rules[pos].kind = kind;
        Ok(())
    }

    /// Returns false when the rule is already first.
    pub fn move_up(&mut self, id: RuleId) -> Result<bool, RuleDefinitionError> {
        let pos = self.index_of(id)?;
        if pos == 0 {
            return Ok(false);
        }
        self.rules.swap(pos, pos - 1);
        Ok(true)
    }

    /// Returns false when the rule is already last.
    pub fn move_down(&mut self, id: RuleId) -> Result<bool, RuleDefinitionError> {
        let pos = self.index_of(id)?;
        if pos + 1 >= self.rules.len() {
            return Ok(false);
        }
        self.rules.swap(pos, pos + 1);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    fn index_of(&self, id: RuleId) -> Result<usize, RuleDefinitionError> {
        self.position(id).ok_or(RuleDefinitionError::UnknownRule(id))
    }
}

/// Presence checks run before a rule enters the list. Pattern syntax is not checked here.
pub fn validate(kind: &RuleKind) -> Result<(), RuleDefinitionError> {
    let missing = |parameter: &'static str| -> Result<(), RuleDefinitionError> {
        Err(RuleDefinitionError::MissingParameter {
            rule_type: kind.rule_type(),
            parameter,
        })
    };

    match kind {
        RuleKind::Replace(p) if p.search.is_empty() => missing("search text"),
        RuleKind::Regex(p) if p.pattern.is_empty() => missing("a pattern"),
        RuleKind::Insert(p) if p.text.is_empty() => missing("text to insert"),
        RuleKind::Insert(p) if p.position == InsertPosition::Index && p.index.is_none() => {
            missing("an insert position")
        }
        RuleKind::Delete(p) if p.mode.uses_text() && p.text.is_empty() => missing("text to delete"),
        RuleKind::Delete(p)
            if matches!(p.mode, DeleteMode::First | DeleteMode::Last | DeleteMode::Range) && p.count == 0 =>
        {
            missing("a character count")
        }
        RuleKind::Serialize(p) if p.digits == 0 || p.digits > MAX_SEQUENCE_DIGITS => {
            Err(RuleDefinitionError::OutOfRange {
                rule_type: kind.rule_type(),
                parameter: "digits",
                min: 1,
                max: MAX_SEQUENCE_DIGITS,
            })
        }
        _ => Ok(()),
    }
}
