use crate::loader::split_lines;
use crate::types::{Cell, CellType, Output, OutputType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Separator placed between rendered outputs.
///
/// A plain newline, so output line counts stay comparable to source line
/// counts. It cannot be told apart from line breaks inside an output.
pub const OUTPUT_BOUNDARY: &str = "\n";

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("ansi escape pattern is valid")
});

/// A prefix of some text, cut on line boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextSlice {
    pub text: String,
    pub total_lines: usize,
    pub returned_lines: usize,
    /// Lines were dropped; ask again with a larger limit to see them
    pub truncated: bool,
}

impl TextSlice {
    /// Keep at most `max_lines` of `lines`, earliest first
    #[must_use]
    pub fn from_lines(lines: &[String], max_lines: Option<usize>) -> Self {
        let total_lines = lines.len();
        let returned_lines = max_lines.map_or(total_lines, |max| max.min(total_lines));
        Self {
            text: lines[..returned_lines].concat(),
            total_lines,
            returned_lines,
            truncated: returned_lines < total_lines,
        }
    }

    /// Line-limited prefix of free text
    #[must_use]
    pub fn from_text(text: &str, max_lines: Option<usize>) -> Self {
        Self::from_lines(&split_lines(text), max_lines)
    }
}

/// What to pull out of a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_output: bool,
    pub max_source_lines: Option<usize>,
    pub max_output_lines: Option<usize>,
}

/// Source and (optionally) rendered output of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellExtract {
    pub index: usize,
    pub cell_type: CellType,
    pub source: TextSlice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<TextSlice>,
}

pub(crate) fn extract_cell(cell: &Cell, options: ExtractOptions, strip: bool) -> CellExtract {
    let output = options
        .include_output
        .then(|| TextSlice::from_text(&render_outputs(cell, strip), options.max_output_lines));

    CellExtract {
        index: cell.index,
        cell_type: cell.cell_type,
        source: TextSlice::from_lines(&cell.source, options.max_source_lines),
        output,
    }
}

/// Render all textual output payloads in order, one boundary between outputs.
///
/// Each output has its trailing newlines trimmed before joining. Outputs that
/// render to nothing are skipped and add no boundary, so the number of
/// outputs is not recoverable from the text; read `cell.outputs` for that.
#[must_use]
pub fn render_outputs(cell: &Cell, strip: bool) -> String {
    let rendered: Vec<String> = cell
        .outputs
        .iter()
        .map(|output| render_output(output, strip))
        .filter(|text| !text.is_empty())
        .collect();
    rendered.join(OUTPUT_BOUNDARY)
}

fn render_output(output: &Output, strip: bool) -> String {
    let text = match output.output_type {
        OutputType::Error => {
            let name = output.error_name.as_deref().unwrap_or("");
            let value = output.error_value.as_deref().unwrap_or("");
            let mut lines = Vec::with_capacity(output.traceback.len() + 1);
            match (name.is_empty(), value.is_empty()) {
                (true, true) => {}
                (false, true) => lines.push(name.to_string()),
                (true, false) => lines.push(value.to_string()),
                (false, false) => lines.push(format!("{name}: {value}")),
            }
            lines.extend(output.traceback.iter().cloned());
            lines.join("\n")
        }
        OutputType::Stream | OutputType::ExecuteResult | OutputType::DisplayData => {
            output.text_or_empty().to_string()
        }
    };

    let text = if strip { strip_ansi(&text) } else { text };
    text.trim_end_matches(['\n', '\r']).to_string()
}

/// Remove terminal color/control escape sequences
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    if !text.contains('\u{1b}') {
        return text.to_string();
    }
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Prefix of at most `max` user-perceived characters
#[must_use]
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
