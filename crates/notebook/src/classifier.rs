use crate::config::RuleConfig;
use crate::types::{Cell, CellTag};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Built-in rule table: tag -> markers that assign it
const BUILTIN_RULES: &[(CellTag, &[&str])] = &[
    (
        CellTag::Installation,
        &["COMPREHENSIVE INSTALLATION", "safe_install"],
    ),
    (CellTag::Imports, &["COMPREHENSIVE IMPORTS", "safe_import"]),
    (CellTag::Helpers, &["HELPER FUNCTIONS"]),
    (CellTag::Functions, &["@safe_cell_execution"]),
];

static WRAPPED_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@safe_cell_execution\(\s*["']([^"']+)["']"#)
        .expect("wrapped function pattern is valid")
});

/// One row of the classification table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub tag: CellTag,
    markers: Vec<String>,
    case_sensitive: bool,
}

impl ClassificationRule {
    pub fn new<I, S>(tag: CellTag, markers: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = markers
            .into_iter()
            .map(|marker| {
                let marker: String = marker.into();
                if case_sensitive {
                    marker
                } else {
                    marker.to_lowercase()
                }
            })
            .collect();
        Self {
            tag,
            markers,
            case_sensitive,
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    fn matches(&self, source: &str, lowered: &str) -> bool {
        let haystack = if self.case_sensitive { source } else { lowered };
        self.markers.iter().any(|marker| haystack.contains(marker.as_str()))
    }
}

impl From<&RuleConfig> for ClassificationRule {
    fn from(rule: &RuleConfig) -> Self {
        Self::new(rule.tag, rule.markers.iter().cloned(), rule.case_sensitive)
    }
}

/// Assigns role tags to cells by evaluating every rule in the table.
///
/// Rules are independent: a cell collects the tag of each rule that matches.
#[derive(Debug, Clone)]
pub struct CellClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for CellClassifier {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl CellClassifier {
    /// Built-in rules followed by `extra`
    #[must_use]
    pub fn new(extra: &[RuleConfig]) -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(tag, markers)| ClassificationRule::new(*tag, markers.iter().copied(), true))
            .chain(extra.iter().map(ClassificationRule::from))
            .collect();
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Tags for a cell; only code cells are classified
    #[must_use]
    pub fn classify(&self, cell: &Cell) -> BTreeSet<CellTag> {
        if !cell.is_code() {
            return BTreeSet::new();
        }
        self.classify_source(&cell.source_text())
    }

    /// Tags for raw source text
    #[must_use]
    pub fn classify_source(&self, source: &str) -> BTreeSet<CellTag> {
        let lowered = if self.rules.iter().any(|r| !r.case_sensitive) {
            source.to_lowercase()
        } else {
            String::new()
        };

        self.rules
            .iter()
            .filter(|rule| rule.matches(source, &lowered))
            .map(|rule| rule.tag)
            .collect()
    }

    /// Name passed to the `@safe_cell_execution("...")` wrapper, if any
    #[must_use]
    pub fn wrapped_function_name(cell: &Cell) -> Option<String> {
        if !cell.is_code() {
            return None;
        }
        let source = cell.source_text();
        WRAPPED_FUNCTION
            .captures(&source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
