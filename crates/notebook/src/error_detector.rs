use crate::config::ReaderConfig;
use crate::extract::{strip_ansi, truncate_graphemes};
use crate::types::{Cell, OutputType};
use serde::Serialize;

/// Error type reported for errors inferred from output text
pub const KEYWORD_ERROR_TYPE: &str = "OutputError";

/// How an error was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The cell recorded an `error` output
    Structural,
    /// Output text contained an error keyword; may be a false positive
    KeywordInferred,
}

/// Error found in a single cell's outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub index: usize,
    pub error_type: String,
    pub error_message: String,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub traceback: Vec<String>,
}

/// Finds execution errors recorded in cell outputs
#[derive(Debug, Clone)]
pub struct ErrorDetector {
    keywords: Vec<String>,
    keyword_fallback: bool,
    message_max_chars: usize,
    strip_ansi: bool,
}

impl Default for ErrorDetector {
    fn default() -> Self {
        Self::new(&ReaderConfig::default())
    }
}

impl ErrorDetector {
    #[must_use]
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            keywords: config
                .error_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            keyword_fallback: config.keyword_fallback,
            message_max_chars: config.keyword_message_max_chars,
            strip_ansi: config.strip_ansi,
        }
    }

    /// First error in the cell; `error` outputs win over keyword hits
    #[must_use]
    pub fn detect(&self, cell: &Cell) -> Option<ErrorInfo> {
        self.structural(cell).or_else(|| self.keyword_inferred(cell))
    }

    fn structural(&self, cell: &Cell) -> Option<ErrorInfo> {
        let output = cell.outputs.iter().find(|o| o.is_error())?;
        let traceback = output
            .traceback
            .iter()
            .map(|frame| {
                if self.strip_ansi {
                    strip_ansi(frame)
                } else {
                    frame.clone()
                }
            })
            .collect();

        Some(ErrorInfo {
            index: cell.index,
            error_type: output.error_name.clone().unwrap_or_default(),
            error_message: output.error_value.clone().unwrap_or_default(),
            kind: ErrorKind::Structural,
            traceback,
        })
    }

    fn keyword_inferred(&self, cell: &Cell) -> Option<ErrorInfo> {
        if !self.keyword_fallback || !cell.is_code() {
            return None;
        }

        let line = cell
            .outputs
            .iter()
            .filter(|o| matches!(o.output_type, OutputType::Stream | OutputType::ExecuteResult))
            .find_map(|o| self.first_keyword_line(o.text_or_empty()))?;

        log::debug!("Cell {} output looks like an error: {line:?}", cell.index);
        Some(ErrorInfo {
            index: cell.index,
            error_type: KEYWORD_ERROR_TYPE.to_string(),
            error_message: truncate_graphemes(line.trim(), self.message_max_chars).to_string(),
            kind: ErrorKind::KeywordInferred,
            traceback: Vec::new(),
        })
    }

    fn first_keyword_line(&self, text: &str) -> Option<String> {
        let text = if self.strip_ansi {
            strip_ansi(text)
        } else {
            text.to_string()
        };
        text.lines()
            .find(|line| {
                let lowered = line.to_lowercase();
                self.keywords.iter().any(|k| lowered.contains(k.as_str()))
            })
            .map(String::from)
    }
}
