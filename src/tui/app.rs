use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::widgets::{ListState, ScrollbarState};

use crate::batch::{BatchSession, EpisodeItem, ItemsFormat, Preview};
use crate::rules::Rule;
use super::models::{Focus, InputMode, SessionStats};

#[derive(Debug)]
pub struct App {
    pub session: BatchSession,
    pub preview: Preview,
    pub items_format: ItemsFormat,
    pub output_path: Option<PathBuf>,
    pub focus: Focus,
    pub episode_state: ListState,
    pub rule_state: ListState,
    pub scroll_state: ScrollbarState,
    pub input_mode: InputMode,
    pub param_input: String,
    pub show_help: bool,
    pub show_preview: bool,
    pub stats: SessionStats,
    pub unsaved: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(session: BatchSession, items_format: ItemsFormat, output_path: Option<PathBuf>) -> Self {
        let mut episode_state = ListState::default();
        if !session.items().is_empty() {
            episode_state.select(Some(0));
        }
        let mut rule_state = ListState::default();
        if !session.rules().is_empty() {
            rule_state.select(Some(0));
        }

        let mut app = Self {
            session,
            preview: Preview::default(),
            items_format,
            output_path,
            focus: Focus::Episodes,
            episode_state,
            rule_state,
            scroll_state: ScrollbarState::default(),
            input_mode: InputMode::Normal,
            param_input: String::new(),
            show_help: false,
            show_preview: true,
            stats: SessionStats::default(),
            unsaved: false,
            should_quit: false,
            status_message: None,
            status_message_time: None,
        };
        app.refresh_preview();
        app
    }

    /// Recomputes every preview title from scratch. Called after any rule or item change.
    pub fn refresh_preview(&mut self) {
        self.preview = self.session.preview();
        let items = self.session.items();
        self.stats = SessionStats {
            total: items.len(),
            changed: self.preview.changed(items).len(),
            failures: self.preview.failures().len(),
        };
        self.scroll_state =
            ScrollbarState::new(items.len()).position(self.episode_state.selected().unwrap_or(0));

        if let Some(first) = self.preview.failures().first() {
            let message = format!(
                "{} rule failed: {}{}",
                first.failure.rule_type,
                first.failure.message,
                if self.stats.failures > 1 {
                    format!(" ({} titles affected)", self.stats.failures)
                } else {
                    String::new()
                }
            );
            self.set_status_message(message);
        }
    }

    pub fn selected_item(&self) -> Option<&EpisodeItem> {
        self.episode_state
            .selected()
            .and_then(|i| self.session.items().get(i))
    }

    pub fn selected_rule(&self) -> Option<&Rule> {
        self.rule_state
            .selected()
            .and_then(|i| self.session.rules().rules().get(i))
    }

    pub fn next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
        self.sync_scroll();
    }

    pub fn previous(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
        self.sync_scroll();
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Episodes => Focus::Rules,
            Focus::Rules => Focus::Episodes,
        };
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some(_), Some(time)) = (&self.status_message, self.status_message_time) {
            if time.elapsed() > Duration::from_secs(4) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Keeps the rule selection inside the list after it shrinks or grows.
    pub fn clamp_rule_selection(&mut self) {
        let len = self.session.rules().len();
        let selected = match self.rule_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.rule_state.select(selected);
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Episodes => self.session.items().len(),
            Focus::Rules => self.session.rules().len(),
        }
    }

    fn focused_state(&mut self) -> &mut ListState {
        match self.focus {
            Focus::Episodes => &mut self.episode_state,
            Focus::Rules => &mut self.rule_state,
        }
    }

    fn sync_scroll(&mut self) {
        if self.focus == Focus::Episodes {
            self.scroll_state = ScrollbarState::new(self.session.items().len())
                .position(self.episode_state.selected().unwrap_or(0));
        }
    }
}
