//! # Context Notebook
//!
//! Read-only indexing and selective extraction for large notebook documents,
//! so an agent can pull just the cells it needs instead of the whole file.
//!
//! ## Architecture
//!
//! ```text
//! raw bytes
//!     │
//!     └──> Loader → Notebook (immutable Cell records)
//!             │
//!             ├──> Classifier      (table-driven role tags)
//!             ├──> Error Detector  (error outputs, keyword fallback)
//!             ├──> Search          (per-line, capped per cell)
//!             ├──> Extractor       (line-limited source/output)
//!             └──> Summary         (per-cell descriptors)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_notebook::{CellTag, NotebookReader};
//!
//! let raw = r##"{"cells": [
//!     {"cell_type": "code", "source": ["# COMPREHENSIVE INSTALLATION\n", "safe_install('numpy')\n"]}
//! ]}"##;
//!
//! let reader = NotebookReader::from_bytes(raw.as_bytes()).unwrap();
//! let summary = reader.summary();
//! assert!(summary[0].tags.contains(&CellTag::Installation));
//!
//! let head = reader.cell_source(0, Some(1)).unwrap();
//! assert!(head.truncated);
//! ```

mod classifier;
mod config;
mod error;
mod error_detector;
mod extract;
mod loader;
mod reader;
mod search;
mod summary;
mod types;

pub use classifier::{CellClassifier, ClassificationRule};
pub use config::{ReaderConfig, RuleConfig};
pub use error::{NotebookError, Result};
pub use error_detector::{ErrorDetector, ErrorInfo, ErrorKind, KEYWORD_ERROR_TYPE};
pub use extract::{
    render_outputs, strip_ansi, CellExtract, ExtractOptions, TextSlice, OUTPUT_BOUNDARY,
};
pub use loader::{parse_notebook, parse_notebook_str, read_notebook};
pub use reader::NotebookReader;
pub use search::{search_cells, SearchHit, SearchOptions};
pub use summary::{CellSummary, InitCell};
pub use types::{Cell, CellTag, CellType, Notebook, NotebookMetadata, Output, OutputType};
