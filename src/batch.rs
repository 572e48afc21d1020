use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::rename_engine::{RenameEngine, RuleFailure};
use crate::rule_set::RuleSet;

pub type EpisodeId = i64;

/// One row of the batch. Fields other than `title` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeItem {
    pub episode_id: EpisodeId,
    pub title: String,
    #[serde(default)]
    pub episode_index: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EpisodeItem {
    pub fn new(episode_id: EpisodeId, title: impl Into<String>, episode_index: i64) -> Self {
        Self {
            episode_id,
            title: title.into(),
            episode_index,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsFormat {
    /// JSON array of episode objects.
    Json,
    /// One title per line.
    Lines,
}

impl ItemsFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ItemsFormat::Json,
            _ => ItemsFormat::Lines,
        }
    }
}

pub fn parse_items(content: &str, format: ItemsFormat) -> Result<Vec<EpisodeItem>> {
    match format {
        ItemsFormat::Json => serde_json::from_str(content).context("Failed to parse episode list"),
        ItemsFormat::Lines => Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| EpisodeItem::new(i as i64 + 1, line, i as i64 + 1))
            .collect()),
    }
}

pub fn render_items(items: &[EpisodeItem], format: ItemsFormat) -> Result<String> {
    match format {
        ItemsFormat::Json => serde_json::to_string_pretty(items).context("Failed to serialize episode list"),
        ItemsFormat::Lines => {
            let mut out = String::new();
            for item in items {
                out.push_str(&item.title);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

pub async fn load_items<P: AsRef<Path>>(path: P) -> Result<(Vec<EpisodeItem>, ItemsFormat)> {
    let path = path.as_ref();
    let format = ItemsFormat::from_path(path);
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read episode list {}", path.display()))?;
    let items = parse_items(&content, format)?;
    info!("Loaded {} episodes from {}", items.len(), path.display());
    Ok((items, format))
}

pub async fn save_items<P: AsRef<Path>>(path: P, items: &[EpisodeItem]) -> Result<()> {
    let path = path.as_ref();
    let content = render_items(items, ItemsFormat::from_path(path))?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write episode list {}", path.display()))?;
    info!("Wrote {} episodes to {}", items.len(), path.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewFailure {
    pub row: usize,
    pub episode_id: EpisodeId,
    pub failure: RuleFailure,
}

/// Proposed titles, one per row of the items they were computed from. Derived data only;
/// rebuild it whenever rules or items change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    rows: Vec<(EpisodeId, String)>,
    failures: Vec<PreviewFailure>,
}

impl Preview {
    /// Proposed title of the first row carrying `episode_id`.
    pub fn get(&self, episode_id: EpisodeId) -> Option<&str> {
        self.rows
            .iter()
            .find(|(id, _)| *id == episode_id)
            .map(|(_, title)| title.as_str())
    }

    /// Proposed title of the row at `row`.
    pub fn row(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|(_, title)| title.as_str())
    }

    /// Proposed title for `item` sitting at `row`, or None if the preview is for a different list.
    pub fn title_for(&self, row: usize, item: &EpisodeItem) -> Option<&str> {
        match self.rows.get(row) {
            Some((id, title)) if *id == item.episode_id => Some(title.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failures(&self) -> &[PreviewFailure] {
        &self.failures
    }

    /// Ids of the items whose proposed title differs from their current one, in row order.
    pub fn changed(&self, items: &[EpisodeItem]) -> Vec<EpisodeId> {
        items
            .iter()
            .enumerate()
            .filter(|(row, item)| self.title_for(*row, item).is_some_and(|t| t != item.title))
            .map(|(_, item)| item.episode_id)
            .collect()
    }
}

/// Runs the rule list over every item, using the row position as the index. Items are not touched.
pub fn preview(items: &[EpisodeItem], rules: &RuleSet) -> Preview {
    let engine = RenameEngine::new(rules.rules());
    let mut preview = Preview::default();

    for (index, item) in items.iter().enumerate() {
        let outcome = engine.rename(&item.title, index);
        debug!("#{} \"{}\" -> \"{}\"", index, item.title, outcome.title);
        preview.failures.extend(outcome.failures.into_iter().map(|failure| PreviewFailure {
            row: index,
            episode_id: item.episode_id,
            failure,
        }));
        preview.rows.push((item.episode_id, outcome.title));
    }

    preview
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleChange {
    pub row: usize,
    pub episode_id: EpisodeId,
    pub previous: String,
    pub applied: String,
}

/// Overwrites each item's title with the preview value for its row and returns what changed.
pub fn apply_preview(items: &mut [EpisodeItem], preview: &Preview) -> Vec<TitleChange> {
    let mut changes = Vec::new();
    for (row, item) in items.iter_mut().enumerate() {
        let Some(title) = preview.title_for(row, item) else {
            continue;
        };
        if title != item.title {
            let previous = std::mem::replace(&mut item.title, title.to_string());
            changes.push(TitleChange {
                row,
                episode_id: item.episode_id,
                previous,
                applied: item.title.clone(),
            });
        }
    }
    changes
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub changed: usize,
    pub failures: Vec<PreviewFailure>,
    pub rules_cleared: bool,
}

/// Rules, items and apply policy of one batch-edit session.
#[derive(Debug, Clone)]
pub struct BatchSession {
    items: Vec<EpisodeItem>,
    rules: RuleSet,
    clear_rules_on_apply: bool,
    last_apply: Option<Vec<TitleChange>>,
}

impl BatchSession {
    pub fn new(items: Vec<EpisodeItem>, rules: RuleSet) -> Self {
        Self {
            items,
            rules,
            clear_rules_on_apply: false,
            last_apply: None,
        }
    }

    pub async fn from_config(config: &SessionConfig) -> Result<(Self, ItemsFormat)> {
        let (items, format) = load_items(&config.items_path).await?;
        let rules = match &config.rules_path {
            Some(path) => RuleSet::load(path).await?,
            None => RuleSet::new(),
        };
        let mut session = Self::new(items, rules);
        session.set_clear_rules_on_apply(config.clear_rules_on_apply);
        Ok((session, format))
    }

    pub fn items(&self) -> &[EpisodeItem] {
        &self.items
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn clear_rules_on_apply(&self) -> bool {
        self.clear_rules_on_apply
    }

    pub fn set_clear_rules_on_apply(&mut self, clear: bool) {
        self.clear_rules_on_apply = clear;
    }

    pub fn can_undo(&self) -> bool {
        self.last_apply.is_some()
    }

    /// Always a full recomputation from the current rules and items.
    pub fn preview(&self) -> Preview {
        preview(&self.items, &self.rules)
    }

    pub fn apply(&mut self) -> ApplyReport {
        let preview = self.preview();
        let changes = apply_preview(&mut self.items, &preview);
        let changed = changes.len();
        // A no-op apply keeps the previous undo point.
        if !changes.is_empty() {
            self.last_apply = Some(changes);
        }

        let rule_count = self.rules.len();
        let rules_cleared = self.clear_rules_on_apply && rule_count > 0;
        if rules_cleared {
            self.rules.clear();
        }

        info!(
            "Applied {} rules: {} of {} titles changed{}",
            rule_count,
            changed,
            self.items.len(),
            if rules_cleared { ", rule list cleared" } else { "" }
        );

        ApplyReport {
            changed,
            failures: preview.failures,
            rules_cleared,
        }
    }

    /// Restores the titles overwritten by the last apply. Returns how many were restored.
    pub fn undo(&mut self) -> usize {
        let Some(changes) = self.last_apply.take() else {
            return 0;
        };

        let mut restored = 0;
        for change in changes.into_iter().rev() {
            if let Some(item) = self.items.get_mut(change.row) {
                if item.episode_id == change.episode_id {
                    item.title = change.previous;
                    restored += 1;
                }
            }
        }

        info!("Undid last apply: {} titles restored", restored);
        restored
    }
}
