use crate::error::{NotebookError, Result};
use crate::types::{Cell, CellType};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// How a search pattern is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Treat the pattern as a regular expression instead of a literal
    pub regex: bool,
}

/// Matching source lines of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub index: usize,
    pub cell_type: CellType,
    pub matches: Vec<String>,
}

enum LineMatcher {
    Literal { needle: String, case_sensitive: bool },
    Pattern(Regex),
}

impl LineMatcher {
    fn compile(pattern: &str, options: SearchOptions) -> Result<Self> {
        if options.regex {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!options.case_sensitive)
                .build()
                .map_err(|e| NotebookError::invalid_pattern(e.to_string()))?;
            return Ok(Self::Pattern(regex));
        }

        let needle = if options.case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };
        Ok(Self::Literal {
            needle,
            case_sensitive: options.case_sensitive,
        })
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Literal {
                needle,
                case_sensitive: true,
            } => line.contains(needle.as_str()),
            Self::Literal {
                needle,
                case_sensitive: false,
            } => line.to_lowercase().contains(needle.as_str()),
            Self::Pattern(regex) => regex.is_match(line),
        }
    }
}

/// Scan every cell's source line by line.
///
/// Cells come back in index order with at most `max_per_cell` snippets each.
/// An empty pattern matches nothing.
pub fn search_cells(
    cells: &[Cell],
    pattern: &str,
    options: SearchOptions,
    max_per_cell: usize,
) -> Result<Vec<SearchHit>> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = LineMatcher::compile(pattern, options)?;

    let hits: Vec<SearchHit> = cells
        .iter()
        .filter_map(|cell| {
            let matches: Vec<String> = cell
                .lines()
                .filter(|line| matcher.is_match(line))
                .take(max_per_cell)
                .map(|line| line.trim().to_string())
                .collect();
            (!matches.is_empty()).then(|| SearchHit {
                index: cell.index,
                cell_type: cell.cell_type,
                matches,
            })
        })
        .collect();

    log::debug!("Search {pattern:?} matched {} cells", hits.len());
    Ok(hits)
}
