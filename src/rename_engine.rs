use regex::{NoExpand, Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

use crate::error::RuleApplyError;
use crate::rules::{
    format_sequence, CaseMode, DeleteMode, InsertPosition, Rule, RuleId, RuleKind, RuleType,
    SerializePosition, MAX_SEQUENCE_DIGITS,
};

/// A rule that could not be applied to one title. The title passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFailure {
    pub rule_id: RuleId,
    pub rule_type: RuleType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameOutcome {
    pub title: String,
    pub failures: Vec<RuleFailure>,
}

/// Applies one rule. Disabled rules return the title unchanged.
pub fn apply_rule(title: &str, rule: &Rule, index: usize) -> Result<String, RuleApplyError> {
    PreparedRule::new(rule).apply(title, index)
}

/// Left-folds every enabled rule over `title`. A failing rule is skipped for this title.
pub fn apply_all_rules(title: &str, rules: &[Rule], index: usize) -> String {
    RenameEngine::new(rules).rename(title, index).title
}

pub fn apply_all_rules_with_report(title: &str, rules: &[Rule], index: usize) -> RenameOutcome {
    RenameEngine::new(rules).rename(title, index)
}

/// A rule list with its patterns compiled once, reused for every row of a batch.
#[derive(Debug)]
pub struct RenameEngine {
    steps: Vec<PreparedRule>,
}

impl RenameEngine {
    pub fn new(rules: &[Rule]) -> Self {
        Self {
            steps: rules.iter().map(PreparedRule::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn rename(&self, title: &str, index: usize) -> RenameOutcome {
        let mut current = title.to_string();
        let mut failures = Vec::new();

        for step in &self.steps {
            match step.apply(&current, index) {
                Ok(next) => current = next,
                Err(e) => {
                    warn!(
                        rule_id = %step.rule.id,
                        rule_type = %step.rule.rule_type(),
                        "rule failed for \"{}\": {}",
                        current,
                        e
                    );
                    failures.push(RuleFailure {
                        rule_id: step.rule.id,
                        rule_type: step.rule.rule_type(),
                        message: e.to_string(),
                    });
                }
            }
        }

        RenameOutcome {
            title: current,
            failures,
        }
    }
}

#[derive(Debug)]
enum Matcher {
    None,
    Compiled(Regex),
    Invalid(RuleApplyError),
}

#[derive(Debug)]
struct PreparedRule {
    rule: Rule,
    matcher: Matcher,
}

impl PreparedRule {
    fn new(rule: &Rule) -> Self {
        let matcher = if !rule.enabled {
            Matcher::None
        } else {
            match &rule.kind {
                RuleKind::Replace(p) if !p.case_sensitive && !p.search.is_empty() => {
                    literal_matcher(&p.search)
                }
                RuleKind::Regex(p) => match Regex::new(&p.pattern) {
                    Ok(re) => Matcher::Compiled(re),
                    Err(source) => Matcher::Invalid(RuleApplyError::InvalidPattern {
                        pattern: p.pattern.clone(),
                        source,
                    }),
                },
                RuleKind::Delete(p) if p.mode.uses_text() && !p.case_sensitive && !p.text.is_empty() => {
                    literal_matcher(&p.text)
                }
                _ => Matcher::None,
            }
        };

        Self {
            rule: rule.clone(),
            matcher,
        }
    }

    fn compiled(&self) -> Result<Option<&Regex>, RuleApplyError> {
        match &self.matcher {
            Matcher::None => Ok(None),
            Matcher::Compiled(re) => Ok(Some(re)),
            Matcher::Invalid(e) => Err(e.clone()),
        }
    }

    fn apply(&self, title: &str, index: usize) -> Result<String, RuleApplyError> {
        if !self.rule.enabled {
            return Ok(title.to_string());
        }

        let re = self.compiled()?;

        let renamed = match &self.rule.kind {
            RuleKind::Replace(p) => {
                if p.search.is_empty() {
                    title.to_string()
                } else {
                    match re {
                        Some(re) => re.replace_all(title, NoExpand(&p.replace)).into_owned(),
                        None => title.replace(&p.search, &p.replace),
                    }
                }
            }
            RuleKind::Regex(p) => match re {
                Some(re) => re.replace_all(title, p.replace.as_str()).into_owned(),
                None => title.to_string(),
            },
            RuleKind::Insert(p) => match p.position {
                InsertPosition::Start => format!("{}{}", p.text, title),
                InsertPosition::End => format!("{}{}", title, p.text),
                InsertPosition::Index => {
                    let offset = p.index.ok_or(RuleApplyError::MissingParameter("index"))?;
                    let at = byte_offset(title, offset.max(0) as usize);
                    format!("{}{}{}", &title[..at], p.text, &title[at..])
                }
            },
            RuleKind::Delete(p) => match p.mode {
                DeleteMode::Text => {
                    if p.text.is_empty() {
                        title.to_string()
                    } else {
                        match re {
                            Some(re) => re.replace_all(title, "").into_owned(),
                            None => title.replace(&p.text, ""),
                        }
                    }
                }
                DeleteMode::First => title[byte_offset(title, p.count)..].to_string(),
                DeleteMode::Last => {
                    let keep = title.chars().count().saturating_sub(p.count);
                    title[..byte_offset(title, keep)].to_string()
                }
                DeleteMode::ToText => match find_text(title, &p.text, re) {
                    Some((_, end)) => title[end..].to_string(),
                    None => title.to_string(),
                },
                DeleteMode::FromText => match find_text(title, &p.text, re) {
                    Some((start, _)) => title[..start].to_string(),
                    None => title.to_string(),
                },
                DeleteMode::Range => {
                    let start = byte_offset(title, p.from);
                    let end = byte_offset(title, p.from.saturating_add(p.count));
                    format!("{}{}", &title[..start], &title[end..])
                }
            },
            RuleKind::Serialize(p) => {
                if p.digits > MAX_SEQUENCE_DIGITS {
                    return Err(RuleApplyError::InvalidParameter("digits"));
                }
                let number = p.start.saturating_add((index as i64).saturating_mul(p.step));
                let token = format!("{}{}{}", p.prefix, format_sequence(number, p.digits), p.suffix);
                match p.position {
                    SerializePosition::Start => format!("{}{}", token, title),
                    SerializePosition::End => format!("{}{}", title, token),
                    SerializePosition::Replace => token,
                }
            }
            RuleKind::Case(p) => match p.mode {
                CaseMode::Upper => title.to_uppercase(),
                CaseMode::Lower => title.to_lowercase(),
                CaseMode::Title => {
                    let mut chars = title.chars();
                    match chars.next() {
                        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase()),
                        None => String::new(),
                    }
                }
            },
            RuleKind::Strip(p) => {
                let mut stripped = title.to_string();
                if p.trim_spaces {
                    stripped = stripped.trim().to_string();
                }
                if p.trim_duplicate_spaces {
                    stripped = collapse_whitespace(&stripped);
                }
                if !p.chars.is_empty() {
                    stripped = stripped.replace(&p.chars, "");
                }
                stripped
            }
        };

        Ok(renamed)
    }
}

fn literal_matcher(text: &str) -> Matcher {
    match RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Matcher::Compiled(re),
        Err(source) => Matcher::Invalid(RuleApplyError::InvalidPattern {
            pattern: text.to_string(),
            source,
        }),
    }
}

/// Byte position of the `chars`-th character, or the end of the string.
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

fn find_text(title: &str, text: &str, re: Option<&Regex>) -> Option<(usize, usize)> {
    if text.is_empty() {
        return None;
    }
    match re {
        Some(re) => re.find(title).map(|m| (m.start(), m.end())),
        None => title.find(text).map(|start| (start, start + text.len())),
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
