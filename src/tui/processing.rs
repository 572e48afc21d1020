use crate::batch::{render_items, save_items};
use super::app::App;

impl App {
    pub fn apply_rules(&mut self) {
        if self.session.rules().is_empty() {
            self.set_status_message("No rules to apply".to_string());
            return;
        }

        let report = self.session.apply();
        if report.changed > 0 {
            self.unsaved = true;
        }
        if report.rules_cleared {
            self.clamp_rule_selection();
        }

        self.refresh_preview();

        let mut message = format!("Applied: {} titles changed", report.changed);
        if !report.failures.is_empty() {
            message.push_str(&format!(", {} rule failures", report.failures.len()));
        }
        if report.rules_cleared {
            message.push_str(", rules cleared");
        }
        self.set_status_message(message);
    }

    pub fn undo_apply(&mut self) {
        if !self.session.can_undo() {
            self.set_status_message("Nothing to undo".to_string());
            return;
        }
        let restored = self.session.undo();
        if restored > 0 {
            self.unsaved = true;
        }
        self.refresh_preview();
        self.set_status_message(format!("Undo: {} titles restored", restored));
    }

    pub fn toggle_clear_policy(&mut self) {
        let clear = !self.session.clear_rules_on_apply();
        self.session.set_clear_rules_on_apply(clear);
        self.set_status_message(format!(
            "Clear rules after apply: {}",
            if clear { "on" } else { "off" }
        ));
    }

    /// Writes the current titles to the configured output file.
    pub async fn save(&mut self) -> anyhow::Result<()> {
        let Some(path) = self.output_path.clone() else {
            self.set_status_message("No output file configured (use --output)".to_string());
            return Ok(());
        };

        save_items(&path, self.session.items()).await?;
        self.unsaved = false;
        self.set_status_message(format!("Saved {} episodes to {}", self.session.items().len(), path.display()));
        Ok(())
    }

    /// The current titles in the format they were loaded in, printed after the terminal is restored.
    pub fn render_result(&self) -> anyhow::Result<String> {
        render_items(self.session.items(), self.items_format)
    }
}
