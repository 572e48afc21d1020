use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single rename instruction.
///
/// Serialized as `{"id": 1, "type": "replace", "enabled": true, "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(id: RuleId, kind: RuleKind) -> Self {
        Self {
            id,
            enabled: true,
            kind,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.kind.rule_type()
    }

    /// One-line description used by the CLI listing and the TUI rules panel.
    pub fn summary(&self) -> String {
        match &self.kind {
            RuleKind::Replace(p) => format!(
                "replace \"{}\" with \"{}\"{}",
                p.search,
                p.replace,
                if p.case_sensitive { " (case-sensitive)" } else { "" }
            ),
            RuleKind::Regex(p) => format!("regex /{}/ -> \"{}\"", p.pattern, p.replace),
            RuleKind::Insert(p) => match p.position {
                InsertPosition::Start => format!("insert \"{}\" at start", p.text),
                InsertPosition::End => format!("insert \"{}\" at end", p.text),
                InsertPosition::Index => match p.index {
                    Some(index) => format!("insert \"{}\" at {}", p.text, index),
                    None => format!("insert \"{}\" at ?", p.text),
                },
            },
            RuleKind::Delete(p) => match p.mode {
                DeleteMode::Text => format!("delete \"{}\"", p.text),
                DeleteMode::First => format!("delete first {}", p.count),
                DeleteMode::Last => format!("delete last {}", p.count),
                DeleteMode::ToText => format!("delete up to \"{}\"", p.text),
                DeleteMode::FromText => format!("delete from \"{}\"", p.text),
                DeleteMode::Range => format!("delete {} from {}", p.count, p.from),
            },
            RuleKind::Serialize(p) => {
                let sample = format!("{}{}{}", p.prefix, format_sequence(p.start, p.digits), p.suffix);
                match p.position {
                    SerializePosition::Start => format!("number \"{}\" at start, step {}", sample, p.step),
                    SerializePosition::End => format!("number \"{}\" at end, step {}", sample, p.step),
                    SerializePosition::Replace => format!("number \"{}\" as title, step {}", sample, p.step),
                }
            }
            RuleKind::Case(p) => match p.mode {
                CaseMode::Upper => "uppercase".to_string(),
                CaseMode::Lower => "lowercase".to_string(),
                CaseMode::Title => "capitalize first letter".to_string(),
            },
            RuleKind::Strip(p) => {
                let mut parts = Vec::new();
                if p.trim_spaces {
                    parts.push("trim".to_string());
                }
                if p.trim_duplicate_spaces {
                    parts.push("collapse spaces".to_string());
                }
                if !p.chars.is_empty() {
                    parts.push(format!("remove \"{}\"", p.chars));
                }
                if parts.is_empty() {
                    "strip (nothing)".to_string()
                } else {
                    format!("strip: {}", parts.join(", "))
                }
            }
        }
    }
}

fn default_true() -> bool {
    true
}

/// The seven rule variants, each with its own parameter bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum RuleKind {
    Replace(ReplaceParams),
    Regex(RegexParams),
    Insert(InsertParams),
    Delete(DeleteParams),
    Serialize(SerializeParams),
    Case(CaseParams),
    Strip(StripParams),
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::Replace(_) => RuleType::Replace,
            RuleKind::Regex(_) => RuleType::Regex,
            RuleKind::Insert(_) => RuleType::Insert,
            RuleKind::Delete(_) => RuleType::Delete,
            RuleKind::Serialize(_) => RuleType::Serialize,
            RuleKind::Case(_) => RuleType::Case,
            RuleKind::Strip(_) => RuleType::Strip,
        }
    }
}

/// Bare variant tag, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Replace,
    Regex,
    Insert,
    Delete,
    Serialize,
    Case,
    Strip,
}

impl RuleType {
    pub const ALL: [RuleType; 7] = [
        RuleType::Replace,
        RuleType::Regex,
        RuleType::Insert,
        RuleType::Delete,
        RuleType::Serialize,
        RuleType::Case,
        RuleType::Strip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Replace => "replace",
            RuleType::Regex => "regex",
            RuleType::Insert => "insert",
            RuleType::Delete => "delete",
            RuleType::Serialize => "serialize",
            RuleType::Case => "case",
            RuleType::Strip => "strip",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceParams {
    pub search: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexParams {
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertPosition {
    Start,
    End,
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertParams {
    pub text: String,
    pub position: InsertPosition,
    /// Character offset, only read when `position` is `index`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteMode {
    Text,
    First,
    Last,
    ToText,
    FromText,
    Range,
}

impl DeleteMode {
    pub fn uses_text(self) -> bool {
        matches!(self, DeleteMode::Text | DeleteMode::ToText | DeleteMode::FromText)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub mode: DeleteMode,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub from: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SerializePosition {
    #[default]
    Start,
    End,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializeParams {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default = "default_one")]
    pub start: i64,
    #[serde(default = "default_one")]
    pub step: i64,
    #[serde(default = "default_digits")]
    pub digits: usize,
    #[serde(default)]
    pub position: SerializePosition,
}

impl Default for SerializeParams {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            start: 1,
            step: 1,
            digits: 2,
            position: SerializePosition::Start,
        }
    }
}

fn default_one() -> i64 {
    1
}

fn default_digits() -> usize {
    2
}

/// Widest zero padding a serialize rule may ask for.
pub const MAX_SEQUENCE_DIGITS: usize = 32;

/// Zero-pads `number` to `digits` width, capped at `MAX_SEQUENCE_DIGITS`. The sign is kept outside the padding.
pub fn format_sequence(number: i64, digits: usize) -> String {
    let digits = digits.min(MAX_SEQUENCE_DIGITS);
    if number < 0 {
        format!("-{:0width$}", number.unsigned_abs(), width = digits)
    } else {
        format!("{:0width$}", number, width = digits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseMode {
    Upper,
    Lower,
    /// First character upper, rest lower. Not per-word.
    Title,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseParams {
    pub mode: CaseMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripParams {
    #[serde(default)]
    pub trim_spaces: bool,
    #[serde(default)]
    pub trim_duplicate_spaces: bool,
    #[serde(default)]
    pub chars: String,
}
