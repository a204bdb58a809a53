//! Configuration structures for receipt extraction and output.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BillerError, Result};

/// Main configuration for biller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillerConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// How free-form category text is mapped onto the canonical categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Trimmed, lower-cased text must equal a category name.
    #[default]
    Exact,
    /// A category matches when either string contains the other.
    Fuzzy,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency symbol that prefixes every item amount.
    pub currency_symbol: String,

    /// Category matching policy.
    pub category_policy: CategoryPolicy,

    /// Warn when the model's own total disagrees with the item sum.
    pub check_stated_total: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            category_policy: CategoryPolicy::Exact,
            check_stated_total: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl BillerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BillerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()
    }
}

impl ExtractionConfig {
    /// The currency symbol must be non-empty and digit-free so it can anchor amounts.
    pub fn validate(&self) -> Result<()> {
        let symbol = self.currency_symbol.trim();
        if symbol.is_empty() {
            return Err(BillerError::Config("currency_symbol must not be empty".to_string()));
        }
        if symbol.chars().any(|c| c.is_ascii_digit()) {
            return Err(BillerError::Config(format!(
                "currency_symbol must not contain digits: {symbol}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BillerConfig::default();
        assert_eq!(config.extraction.currency_symbol, "€");
        assert_eq!(config.extraction.category_policy, CategoryPolicy::Exact);
        assert!(config.extraction.check_stated_total);
        assert!(!config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BillerConfig =
            serde_json::from_str(r#"{"extraction": {"category_policy": "fuzzy"}}"#).unwrap();
        assert_eq!(config.extraction.category_policy, CategoryPolicy::Fuzzy);
        assert_eq!(config.extraction.currency_symbol, "€");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillerConfig::default();
        config.extraction.currency_symbol = "$".to_string();
        config.output.pretty = true;
        config.save(&path).unwrap();

        let loaded = BillerConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_bad_symbol() {
        let mut config = BillerConfig::default();
        config.extraction.currency_symbol = "  ".to_string();
        assert!(matches!(config.validate(), Err(BillerError::Config(_))));

        config.extraction.currency_symbol = "E1".to_string();
        assert!(matches!(config.validate(), Err(BillerError::Config(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = BillerConfig::from_file(Path::new("/nonexistent/biller/config.json"));
        assert!(matches!(result, Err(BillerError::Io(_))));
    }
}
