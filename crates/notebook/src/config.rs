use crate::error::{NotebookError, Result};
use crate::types::CellTag;
use serde::{Deserialize, Serialize};

/// Configuration for notebook queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum matching lines kept per cell in search results
    pub max_matches_per_cell: usize,

    /// Maximum characters of the first non-blank line in cell summaries
    pub first_line_max_chars: usize,

    /// Maximum characters of output text carried by a keyword-inferred error
    pub keyword_message_max_chars: usize,

    /// Scan plain output text for error keywords when no error output exists
    pub keyword_fallback: bool,

    /// Keywords that mark output text as an error (matched case-insensitively)
    pub error_keywords: Vec<String>,

    /// Remove terminal color escapes from rendered tracebacks
    pub strip_ansi: bool,

    /// Classification rules appended after the built-in table
    pub extra_rules: Vec<RuleConfig>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_matches_per_cell: 3,
            first_line_max_chars: 100,
            keyword_message_max_chars: 500,
            keyword_fallback: true,
            error_keywords: ["error:", "exception:", "failed:", "traceback"]
                .into_iter()
                .map(String::from)
                .collect(),
            strip_ansi: true,
            extra_rules: Vec::new(),
        }
    }
}

impl ReaderConfig {
    /// Only report errors recorded as `error` outputs
    pub fn structural_errors_only() -> Self {
        Self {
            keyword_fallback: false,
            ..Default::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| NotebookError::invalid_config(e.to_string()))?;
        config.validate().map_err(NotebookError::invalid_config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_matches_per_cell == 0 {
            return Err("max_matches_per_cell must be > 0".to_string());
        }

        if self.first_line_max_chars == 0 {
            return Err("first_line_max_chars must be > 0".to_string());
        }

        if self.keyword_fallback {
            if self.error_keywords.is_empty() {
                return Err("error_keywords cannot be empty while keyword_fallback is on".to_string());
            }
            if self.error_keywords.iter().any(|k| k.trim().is_empty()) {
                return Err("error_keywords cannot contain blank entries".to_string());
            }
        }

        for rule in &self.extra_rules {
            if rule.markers.is_empty() || rule.markers.iter().any(|m| m.is_empty()) {
                return Err(format!(
                    "rule for {} needs at least one non-empty marker",
                    rule.tag
                ));
            }
        }

        Ok(())
    }
}

/// A user-supplied classification rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Tag assigned when any marker matches
    pub tag: CellTag,

    /// Marker strings searched for in the cell source
    pub markers: Vec<String>,

    /// Match markers case-sensitively
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ReaderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_matches_per_cell, 3);
    }

    #[test]
    fn test_preset_config_valid() {
        let config = ReaderConfig::structural_errors_only();
        assert!(!config.keyword_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ReaderConfig {
            max_matches_per_cell: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_matches_per_cell = 3;
        config.error_keywords.clear();
        assert!(config.validate().is_err());

        // Empty keywords are fine once the fallback is off
        config.keyword_fallback = false;
        assert!(config.validate().is_ok());

        config.extra_rules.push(RuleConfig {
            tag: CellTag::Helpers,
            markers: vec![],
            case_sensitive: true,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ReaderConfig::from_toml_str(
            r#"
max_matches_per_cell = 5

[[extra_rules]]
tag = "IMPORTS"
markers = ["import numpy"]
case_sensitive = false
"#,
        )
        .expect("valid toml");

        assert_eq!(config.max_matches_per_cell, 5);
        assert_eq!(config.first_line_max_chars, 100);
        assert_eq!(config.extra_rules.len(), 1);
        assert_eq!(config.extra_rules[0].tag, CellTag::Imports);
        assert!(!config.extra_rules[0].case_sensitive);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let err = ReaderConfig::from_toml_str("max_matches_per_cell = 0").unwrap_err();
        assert!(matches!(err, NotebookError::InvalidConfig(_)));

        let err = ReaderConfig::from_toml_str("max_matches_per_cell = \"three\"").unwrap_err();
        assert!(matches!(err, NotebookError::InvalidConfig(_)));
    }
}
