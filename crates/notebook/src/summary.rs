use crate::classifier::CellClassifier;
use crate::error_detector::ErrorDetector;
use crate::extract::truncate_graphemes;
use crate::types::{Cell, CellTag, CellType};
use serde::Serialize;
use std::collections::BTreeSet;

/// Compact per-cell descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSummary {
    pub index: usize,
    pub cell_type: CellType,
    pub line_count: usize,
    pub tags: BTreeSet<CellTag>,
    pub has_error: bool,
    pub first_nonblank_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

/// A setup cell: any cell with at least one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitCell {
    pub index: usize,
    pub tags: BTreeSet<CellTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

pub(crate) fn summarize_cell(
    cell: &Cell,
    classifier: &CellClassifier,
    detector: &ErrorDetector,
    first_line_max_chars: usize,
) -> CellSummary {
    let tags = classifier.classify(cell);
    let function_name = tags
        .contains(&CellTag::Functions)
        .then(|| CellClassifier::wrapped_function_name(cell))
        .flatten();

    CellSummary {
        index: cell.index,
        cell_type: cell.cell_type,
        line_count: cell.line_count(),
        tags,
        has_error: detector.detect(cell).is_some(),
        first_nonblank_line: truncate_graphemes(cell.first_nonblank_line(), first_line_max_chars)
            .to_string(),
        function_name,
    }
}

pub(crate) fn init_cell(cell: &Cell, classifier: &CellClassifier) -> Option<InitCell> {
    let tags = classifier.classify(cell);
    if tags.is_empty() {
        return None;
    }
    let function_name = tags
        .contains(&CellTag::Functions)
        .then(|| CellClassifier::wrapped_function_name(cell))
        .flatten();
    Some(InitCell {
        index: cell.index,
        tags,
        function_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::split_lines;
    use crate::types::Output;

    #[test]
    fn summary_composes_classifier_and_detector() {
        let cell = Cell::new(
            4,
            CellType::Code,
            split_lines("\n@safe_cell_execution(\"fold\")\ndef fold():\n    raise ValueError\n"),
        )
        .with_outputs(vec![Output::error("ValueError", "")]);

        let summary = summarize_cell(
            &cell,
            &CellClassifier::default(),
            &ErrorDetector::default(),
            100,
        );
        assert_eq!(summary.index, 4);
        assert_eq!(summary.line_count, 4);
        assert_eq!(summary.tags, BTreeSet::from([CellTag::Functions]));
        assert!(summary.has_error);
        assert_eq!(summary.first_nonblank_line, "@safe_cell_execution(\"fold\")");
        assert_eq!(summary.function_name.as_deref(), Some("fold"));
    }

    #[test]
    fn first_line_is_capped() {
        let cell = Cell::new(0, CellType::Markdown, split_lines("# A very long heading\n"));
        let summary = summarize_cell(
            &cell,
            &CellClassifier::default(),
            &ErrorDetector::default(),
            5,
        );
        assert_eq!(summary.first_nonblank_line, "# A v");
        assert!(summary.tags.is_empty());
        assert_eq!(summary.function_name, None);
    }

    #[test]
    fn init_cells_require_a_tag() {
        let classifier = CellClassifier::default();
        let plain = Cell::new(0, CellType::Code, split_lines("import os\n"));
        assert!(init_cell(&plain, &classifier).is_none());

        let helpers = Cell::new(1, CellType::Code, split_lines("# HELPER FUNCTIONS\n"));
        let init = init_cell(&helpers, &classifier).expect("tagged");
        assert_eq!(init.tags, BTreeSet::from([CellTag::Helpers]));
    }
}
