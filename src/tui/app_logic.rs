use crossterm::event::KeyCode;

use crate::rules::RuleType;
use super::app::App;
use super::models::{Focus, InputMode};
use super::param_input::{format_rule_params, param_template, parse_rule_params};

impl App {
    /// Handles every key except saving, which needs the async runtime.
    pub fn handle_key(&mut self, code: KeyCode) {
        match self.input_mode.clone() {
            InputMode::Normal => self.handle_normal_key(code),
            InputMode::ChooseRuleType => self.handle_rule_type_key(code),
            InputMode::EditParams { .. } => self.handle_param_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::F(1)) {
                self.toggle_help();
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::F(1) => self.toggle_help(),
            KeyCode::Char('p') => self.toggle_preview(),
            KeyCode::Tab => self.switch_focus(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char('a') => self.begin_add_rule(),
            KeyCode::Char('e') => self.begin_edit_rule(),
            KeyCode::Char(' ') => self.toggle_selected_rule(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected_rule(),
            KeyCode::Char('[') => self.move_selected_rule(true),
            KeyCode::Char(']') => self.move_selected_rule(false),
            KeyCode::Char('c') => self.toggle_clear_policy(),
            KeyCode::Enter => self.apply_rules(),
            KeyCode::Char('u') => self.undo_apply(),
            _ => {}
        }
    }

    fn handle_rule_type_key(&mut self, code: KeyCode) {
        let rule_type = match code {
            KeyCode::Char('r') => RuleType::Replace,
            KeyCode::Char('x') => RuleType::Regex,
            KeyCode::Char('i') => RuleType::Insert,
            KeyCode::Char('d') => RuleType::Delete,
            KeyCode::Char('n') => RuleType::Serialize,
            KeyCode::Char('c') => RuleType::Case,
            KeyCode::Char('s') => RuleType::Strip,
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                return;
            }
            _ => return,
        };

        self.param_input = param_template(rule_type).to_string();
        self.input_mode = InputMode::EditParams {
            rule_type,
            editing: None,
        };
    }

    fn handle_param_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.cancel_input(),
            KeyCode::Enter => self.submit_params(),
            KeyCode::Backspace => {
                self.param_input.pop();
            }
            KeyCode::Char(c) => self.param_input.push(c),
            _ => {}
        }
    }

    pub fn begin_add_rule(&mut self) {
        self.input_mode = InputMode::ChooseRuleType;
    }

    pub fn begin_edit_rule(&mut self) {
        if let Some(rule) = self.selected_rule() {
            let rule_type = rule.rule_type();
            let editing = Some(rule.id);
            self.param_input = format_rule_params(&rule.kind);
            self.input_mode = InputMode::EditParams { rule_type, editing };
        } else {
            self.set_status_message("No rule selected".to_string());
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.param_input.clear();
    }

    /// Builds a rule from the prompt. On any error the prompt stays open and the rule list is unchanged.
    pub fn submit_params(&mut self) {
        let InputMode::EditParams { rule_type, editing } = self.input_mode.clone() else {
            return;
        };

        let kind = match parse_rule_params(rule_type, &self.param_input) {
            Ok(kind) => kind,
            Err(e) => {
                self.set_status_message(format!("Invalid {} parameters: {}", rule_type, e));
                return;
            }
        };

        let rules = self.session.rules_mut();
        let result = match editing {
            Some(id) => rules.update(id, kind).map(|_| id),
            None => rules.add(kind),
        };

        match result {
            Ok(id) => {
                if let Some(pos) = self.session.rules().position(id) {
                    self.rule_state.select(Some(pos));
                }
                self.focus = Focus::Rules;
                self.cancel_input();
                self.set_status_message(format!(
                    "{} {} rule",
                    if editing.is_some() { "Updated" } else { "Added" },
                    rule_type
                ));
                self.refresh_preview();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn toggle_selected_rule(&mut self) {
        let Some(id) = self.selected_rule().map(|r| r.id) else {
            return;
        };
        match self.session.rules_mut().toggle(id) {
            Ok(enabled) => {
                self.set_status_message(format!(
                    "Rule {} {}",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                ));
                self.refresh_preview();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn remove_selected_rule(&mut self) {
        let Some(id) = self.selected_rule().map(|r| r.id) else {
            return;
        };
        match self.session.rules_mut().remove(id) {
            Ok(rule) => {
                self.clamp_rule_selection();
                self.set_status_message(format!("Removed {} rule", rule.rule_type()));
                self.refresh_preview();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn move_selected_rule(&mut self, up: bool) {
        let Some(id) = self.selected_rule().map(|r| r.id) else {
            return;
        };
        let rules = self.session.rules_mut();
        let moved = if up { rules.move_up(id) } else { rules.move_down(id) };
        match moved {
            Ok(true) => {
                self.rule_state.select(self.session.rules().position(id));
                self.refresh_preview();
            }
            Ok(false) => {}
            Err(e) => self.set_status_message(e.to_string()),
        }
    }
}
