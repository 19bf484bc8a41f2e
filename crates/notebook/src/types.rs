use crate::error::{NotebookError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loaded notebook: document-level metadata plus the ordered cells.
///
/// Built once per load and never mutated afterwards; reloading produces a new value.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Notebook {
    /// Document-level metadata (all fields optional)
    pub metadata: NotebookMetadata,

    cells: Vec<Cell>,
}

impl Notebook {
    /// Create a notebook from cells, renumbering them to match their position
    #[must_use]
    pub fn new(metadata: NotebookMetadata, mut cells: Vec<Cell>) -> Self {
        for (position, cell) in cells.iter_mut().enumerate() {
            cell.index = position;
        }
        Self { metadata, cells }
    }

    /// All cells in document order
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the notebook has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a cell by index
    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.cells.get(index).ok_or(NotebookError::IndexOutOfRange {
            index,
            len: self.cells.len(),
        })
    }
}

/// Notebook-level metadata
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NotebookMetadata {
    /// Major format version (`nbformat`)
    pub nbformat: Option<u32>,

    /// Minor format version (`nbformat_minor`)
    pub nbformat_minor: Option<u32>,

    /// Kernel name (e.g., "python3")
    pub kernel_name: Option<String>,

    /// Programming language name (e.g., "python")
    pub language: Option<String>,
}

/// One unit of a notebook
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Cell {
    /// Position in the notebook (0-indexed)
    pub index: usize,

    /// Kind of cell
    pub cell_type: CellType,

    /// Cell identifier, when the document records one
    pub id: Option<String>,

    /// Execution counter for code cells that ran
    pub execution_count: Option<i64>,

    /// Source lines, each keeping its trailing newline
    pub source: Vec<String>,

    /// Recorded outputs in document order (always empty for non-code cells)
    pub outputs: Vec<Output>,
}

impl Cell {
    /// Create a cell from its kind and source lines
    #[must_use]
    pub fn new(index: usize, cell_type: CellType, source: Vec<String>) -> Self {
        Self {
            index,
            cell_type,
            id: None,
            execution_count: None,
            source,
            outputs: Vec::new(),
        }
    }

    /// Builder: attach outputs
    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<Output>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Joined source text
    #[must_use]
    pub fn source_text(&self) -> String {
        self.source.concat()
    }

    /// Source lines without line terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source
            .iter()
            .map(|line| line.trim_end_matches(['\n', '\r']))
    }

    /// Number of source lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.source.len()
    }

    /// First line with non-whitespace content, trimmed
    #[must_use]
    pub fn first_nonblank_line(&self) -> &str {
        self.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }

    #[must_use]
    pub const fn is_code(&self) -> bool {
        matches!(self.cell_type, CellType::Code)
    }
}

/// Type of notebook cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Executable code
    #[default]
    Code,
    /// Narrative text
    Markdown,
    /// Unformatted text
    Raw,
}

impl CellType {
    /// Parse the document's `cell_type` string
    #[must_use]
    pub fn from_document(value: &str) -> Option<Self> {
        match value {
            "code" => Some(Self::Code),
            "markdown" => Some(Self::Markdown),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded result attached to a code cell
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Output {
    /// Kind of output
    pub output_type: OutputType,

    /// Textual payload for stream/result/display outputs
    pub text: Option<String>,

    /// Exception class name (`ename`), error outputs only
    pub error_name: Option<String>,

    /// Exception message (`evalue`), error outputs only
    pub error_value: Option<String>,

    /// Traceback lines, error outputs only
    pub traceback: Vec<String>,
}

impl Output {
    /// Create a stream output carrying text
    pub fn stream(text: impl Into<String>) -> Self {
        Self {
            output_type: OutputType::Stream,
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create an error output
    pub fn error(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output_type: OutputType::Error,
            error_name: Some(name.into()),
            error_value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Builder: set traceback lines
    #[must_use]
    pub fn with_traceback(mut self, traceback: Vec<String>) -> Self {
        self.traceback = traceback;
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.output_type, OutputType::Error)
    }

    /// Text payload, empty when absent
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Type of cell output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// stdout/stderr text
    #[default]
    Stream,
    /// Value of the last expression
    ExecuteResult,
    /// Rich display payload
    DisplayData,
    /// Raised exception
    Error,
}

impl OutputType {
    /// Parse the document's `output_type` string
    #[must_use]
    pub fn from_document(value: &str) -> Option<Self> {
        match value {
            "stream" => Some(Self::Stream),
            "execute_result" => Some(Self::ExecuteResult),
            "display_data" => Some(Self::DisplayData),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::ExecuteResult => "execute_result",
            Self::DisplayData => "display_data",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification label assigned to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellTag {
    Installation,
    Imports,
    Helpers,
    Functions,
}

impl CellTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Installation => "INSTALLATION",
            Self::Imports => "IMPORTS",
            Self::Helpers => "HELPERS",
            Self::Functions => "FUNCTIONS",
        }
    }
}

impl fmt::Display for CellTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn notebook_renumbers_cells() {
        let cells = vec![
            Cell::new(9, CellType::Markdown, lines(&["# a"])),
            Cell::new(4, CellType::Code, lines(&["x = 1"])),
        ];
        let notebook = Notebook::new(NotebookMetadata::default(), cells);
        let indices: Vec<usize> = notebook.cells().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn notebook_renumbers_duplicate_indices() {
        let cells = vec![
            Cell::new(7, CellType::Code, lines(&["a = 1"])),
            Cell::new(7, CellType::Code, lines(&["b = 2"])),
        ];
        let notebook = Notebook::new(NotebookMetadata::default(), cells);
        assert_eq!(notebook.cell(1).map(|c| c.index).ok(), Some(1));
    }

    #[test]
    fn cell_lookup_out_of_range() {
        let notebook = Notebook::new(
            NotebookMetadata::default(),
            vec![Cell::new(0, CellType::Code, lines(&["x = 1"]))],
        );
        assert!(notebook.cell(0).is_ok());
        assert!(matches!(
            notebook.cell(1),
            Err(NotebookError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn first_nonblank_line_skips_whitespace() {
        let cell = Cell::new(0, CellType::Code, lines(&["\n", "   \n", "  import os\n"]));
        assert_eq!(cell.first_nonblank_line(), "import os");

        let blank = Cell::new(0, CellType::Code, lines(&["\n", "\t\n"]));
        assert_eq!(blank.first_nonblank_line(), "");
    }

    #[test]
    fn lines_strip_terminators() {
        let cell = Cell::new(0, CellType::Code, lines(&["a\r\n", "b\n", "c"]));
        assert_eq!(cell.lines().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(cell.source_text(), "a\r\nb\nc");
    }

    #[test]
    fn type_strings_match_document_vocabulary() {
        assert_eq!(CellType::from_document("markdown"), Some(CellType::Markdown));
        assert_eq!(CellType::from_document("heading"), None);
        assert_eq!(
            OutputType::from_document("execute_result"),
            Some(OutputType::ExecuteResult)
        );
        assert_eq!(OutputType::from_document("pyout"), None);
        assert_eq!(OutputType::from_document("pyerr"), None);
        assert_eq!(OutputType::Error.to_string(), "error");
        assert_eq!(CellTag::Installation.to_string(), "INSTALLATION");
    }
}
