use std::path::{Path, PathBuf};

use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub items_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    /// Empty the rule list after every successful apply.
    pub clear_rules_on_apply: bool,
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    items_path: Option<PathBuf>,
    rules_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    clear_rules_on_apply: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.items_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn rules<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.rules_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    pub fn output<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.output_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    pub fn clear_rules_on_apply(mut self, clear: bool) -> Self {
        self.clear_rules_on_apply = clear;
        self
    }

    pub fn build(self) -> Result<SessionConfig> {
        let items_path = self
            .items_path
            .ok_or_else(|| anyhow::anyhow!("Episode list path is required"))?;

        if items_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Episode list path is empty"));
        }

        Ok(SessionConfig {
            items_path,
            rules_path: self.rules_path,
            output_path: self.output_path,
            clear_rules_on_apply: self.clear_rules_on_apply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .items("episodes.json")
            .rules(Some("rules.json"))
            .output(None::<&str>)
            .build()
            .unwrap();

        assert_eq!(config.items_path, PathBuf::from("episodes.json"));
        assert_eq!(config.rules_path, Some(PathBuf::from("rules.json")));
        assert_eq!(config.output_path, None);
        assert!(!config.clear_rules_on_apply);
    }

    #[test]
    fn test_config_builder_requires_items() {
        assert!(ConfigBuilder::new().rules(Some("rules.json")).build().is_err());
        assert!(ConfigBuilder::new().items("").build().is_err());
    }
}
