use crate::classifier::CellClassifier;
use crate::config::ReaderConfig;
use crate::error::{NotebookError, Result};
use crate::error_detector::{ErrorDetector, ErrorInfo};
use crate::extract::{extract_cell, CellExtract, ExtractOptions, TextSlice};
use crate::loader;
use crate::search::{search_cells, SearchHit, SearchOptions};
use crate::summary::{init_cell, summarize_cell, CellSummary, InitCell};
use crate::types::{Cell, CellType, Notebook};
use std::io::Read;

/// Query surface over one loaded notebook.
///
/// Every query is a pure read; nothing is cached, so results always reflect
/// the notebook this reader was built from.
#[derive(Debug, Clone)]
pub struct NotebookReader {
    notebook: Notebook,
    config: ReaderConfig,
    classifier: CellClassifier,
    detector: ErrorDetector,
}

impl NotebookReader {
    /// Wrap an already-loaded notebook
    pub fn new(notebook: Notebook, config: ReaderConfig) -> Result<Self> {
        config.validate().map_err(NotebookError::invalid_config)?;
        let classifier = CellClassifier::new(&config.extra_rules);
        let detector = ErrorDetector::new(&config);
        Ok(Self {
            notebook,
            config,
            classifier,
            detector,
        })
    }

    /// Load from raw bytes with default configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::new(loader::parse_notebook(bytes)?, ReaderConfig::default())
    }

    /// Load from any reader with the given configuration
    pub fn from_reader(reader: impl Read, config: ReaderConfig) -> Result<Self> {
        Self::new(loader::read_notebook(reader)?, config)
    }

    #[must_use]
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// One descriptor per cell, in index order
    #[must_use]
    pub fn summary(&self) -> Vec<CellSummary> {
        self.notebook
            .cells()
            .iter()
            .map(|cell| {
                summarize_cell(
                    cell,
                    &self.classifier,
                    &self.detector,
                    self.config.first_line_max_chars,
                )
            })
            .collect()
    }

    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.notebook.cell(index)
    }

    /// Cells of a single type, in index order
    #[must_use]
    pub fn cells_by_type(&self, cell_type: CellType) -> Vec<&Cell> {
        self.notebook
            .cells()
            .iter()
            .filter(|cell| cell.cell_type == cell_type)
            .collect()
    }

    /// Cells carrying at least one tag
    #[must_use]
    pub fn initialization_cells(&self) -> Vec<InitCell> {
        self.notebook
            .cells()
            .iter()
            .filter_map(|cell| init_cell(cell, &self.classifier))
            .collect()
    }

    /// At most one error per cell, in index order
    #[must_use]
    pub fn error_cells(&self) -> Vec<ErrorInfo> {
        self.notebook
            .cells()
            .iter()
            .filter_map(|cell| self.detector.detect(cell))
            .collect()
    }

    /// Case-insensitive literal search over cell sources
    pub fn search(&self, pattern: &str) -> Result<Vec<SearchHit>> {
        self.search_with(pattern, SearchOptions::default())
    }

    pub fn search_with(&self, pattern: &str, options: SearchOptions) -> Result<Vec<SearchHit>> {
        search_cells(
            self.notebook.cells(),
            pattern,
            options,
            self.config.max_matches_per_cell,
        )
    }

    pub fn cell_source(&self, index: usize, max_lines: Option<usize>) -> Result<TextSlice> {
        let cell = self.cell(index)?;
        Ok(TextSlice::from_lines(&cell.source, max_lines))
    }

    pub fn cell_output(&self, index: usize, max_lines: Option<usize>) -> Result<TextSlice> {
        let extract = self.extract(
            index,
            ExtractOptions {
                include_output: true,
                max_source_lines: Some(0),
                max_output_lines: max_lines,
            },
        )?;
        Ok(extract.output.unwrap_or_default())
    }

    pub fn extract(&self, index: usize, options: ExtractOptions) -> Result<CellExtract> {
        let cell = self.cell(index)?;
        Ok(extract_cell(cell, options, self.config.strip_ansi))
    }
}
