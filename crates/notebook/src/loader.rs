//! Conversion from raw document bytes into [`Notebook`] records.
//!
//! This is the only place that looks at the loosely-typed JSON. Anything
//! missing or oddly shaped below the top level is absorbed here with a
//! neutral default, so the query modules can rely on plain typed records.

use crate::error::{NotebookError, Result};
use crate::types::{Cell, CellType, Notebook, NotebookMetadata, Output, OutputType};
use serde_json::{Map, Value};
use std::io::Read;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a notebook from raw bytes
pub fn parse_notebook(bytes: &[u8]) -> Result<Notebook> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)?;
    parse_notebook_str(text)
}

/// Parse a notebook from any reader (file, socket, stdin)
pub fn read_notebook(mut reader: impl Read) -> Result<Notebook> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_notebook(&bytes)
}

/// Parse a notebook from already-decoded text
pub fn parse_notebook_str(text: &str) -> Result<Notebook> {
    let root: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .map_err(|e| NotebookError::malformed(format!("invalid JSON: {e}")))?;

    let Some(root) = root.as_object() else {
        return Err(NotebookError::malformed("top-level value is not an object"));
    };
    let Some(raw_cells) = root.get("cells").and_then(Value::as_array) else {
        return Err(NotebookError::malformed("missing `cells` array"));
    };

    let metadata = extract_metadata(root);
    let cells: Vec<Cell> = raw_cells
        .iter()
        .enumerate()
        .map(|(position, raw)| cell_from_value(position, raw))
        .collect();

    log::debug!(
        "Loaded notebook: {} cells, nbformat {}.{}",
        cells.len(),
        metadata.nbformat.unwrap_or(0),
        metadata.nbformat_minor.unwrap_or(0)
    );

    Ok(Notebook::new(metadata, cells))
}

fn extract_metadata(root: &Map<String, Value>) -> NotebookMetadata {
    let version = |key: &str| {
        root.get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };
    let meta = root.get("metadata");
    let nested_str = |outer: &str, inner: &str| {
        meta.and_then(|m| m.get(outer))
            .and_then(|o| o.get(inner))
            .and_then(Value::as_str)
            .map(String::from)
    };

    NotebookMetadata {
        nbformat: version("nbformat"),
        nbformat_minor: version("nbformat_minor"),
        kernel_name: nested_str("kernelspec", "name"),
        language: nested_str("language_info", "name")
            .or_else(|| nested_str("kernelspec", "language")),
    }
}

fn cell_from_value(position: usize, raw: &Value) -> Cell {
    let Some(obj) = raw.as_object() else {
        log::warn!("Cell {position} is not an object; treating it as an empty raw cell");
        return Cell::new(position, CellType::Raw, Vec::new());
    };

    let raw_type = obj.get("cell_type").and_then(Value::as_str).unwrap_or("");
    let cell_type = CellType::from_document(raw_type).unwrap_or_else(|| {
        log::warn!("Cell {position} has unknown cell_type {raw_type:?}; treating it as raw");
        CellType::Raw
    });

    let source = obj.get("source").map(text_lines).unwrap_or_default();
    let mut cell = Cell::new(position, cell_type, source);
    cell.id = obj.get("id").and_then(Value::as_str).map(String::from);

    if cell_type == CellType::Code {
        cell.execution_count = obj.get("execution_count").and_then(Value::as_i64);
        cell.outputs = obj
            .get("outputs")
            .and_then(Value::as_array)
            .map(|outputs| {
                outputs
                    .iter()
                    .filter_map(|o| output_from_value(position, o))
                    .collect()
            })
            .unwrap_or_default();
    }

    cell
}

fn output_from_value(position: usize, raw: &Value) -> Option<Output> {
    let Some(obj) = raw.as_object() else {
        log::warn!("Cell {position} has a non-object output entry; skipping it");
        return None;
    };

    let raw_type = obj.get("output_type").and_then(Value::as_str).unwrap_or("");
    let output_type = OutputType::from_document(raw_type).unwrap_or_else(|| {
        log::warn!("Cell {position} has unknown output_type {raw_type:?}; reading it as stream");
        OutputType::Stream
    });

    let mut output = Output {
        output_type,
        ..Default::default()
    };

    match output_type {
        OutputType::Error => {
            output.error_name = obj.get("ename").and_then(Value::as_str).map(String::from);
            output.error_value = obj.get("evalue").and_then(Value::as_str).map(String::from);
            output.traceback = obj
                .get("traceback")
                .map(|tb| match tb {
                    Value::Array(frames) => frames
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect(),
                    Value::String(s) => s.lines().map(String::from).collect(),
                    _ => Vec::new(),
                })
                .unwrap_or_default();
        }
        OutputType::Stream => {
            output.text = obj.get("text").and_then(multiline_text);
        }
        OutputType::ExecuteResult | OutputType::DisplayData => {
            output.text = obj.get("text").and_then(multiline_text).or_else(|| {
                obj.get("data")
                    .and_then(|data| data.get("text/plain"))
                    .and_then(multiline_text)
            });
        }
    }

    Some(output)
}

/// Joined form of a value that is either a string or a list of strings
fn multiline_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(parts.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

/// Normalize a string-or-list source into lines that keep their `\n`
fn text_lines(value: &Value) -> Vec<String> {
    multiline_text(value)
        .map(|text| split_lines(&text))
        .unwrap_or_default()
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn string_and_list_sources_normalize_identically() {
        let as_list = parse_notebook_str(
            r#"{"cells": [{"cell_type": "code", "source": ["a = 1\n", "b = 2"]}]}"#,
        )
        .unwrap();
        let as_string = parse_notebook_str(
            r#"{"cells": [{"cell_type": "code", "source": "a = 1\nb = 2"}]}"#,
        )
        .unwrap();

        assert_eq!(as_list.cells()[0].source, vec!["a = 1\n", "b = 2"]);
        assert_eq!(as_list.cells()[0].source, as_string.cells()[0].source);
    }

    #[test]
    fn list_entries_with_embedded_newlines_are_resplit() {
        let nb = parse_notebook_str(
            r#"{"cells": [{"cell_type": "code", "source": ["x\ny\n", "z"]}]}"#,
        )
        .unwrap();
        assert_eq!(nb.cells()[0].line_count(), 3);
    }

    #[test]
    fn missing_fields_default_to_neutral_values() {
        let nb = parse_notebook_str(r#"{"cells": [{}, 42, {"cell_type": "code"}]}"#).unwrap();
        assert_eq!(nb.len(), 3);
        assert_eq!(nb.cells()[0].cell_type, CellType::Raw);
        assert!(nb.cells()[0].source.is_empty());
        assert_eq!(nb.cells()[1].cell_type, CellType::Raw);
        assert_eq!(nb.cells()[2].cell_type, CellType::Code);
        assert!(nb.cells()[2].outputs.is_empty());
    }

    #[test]
    fn markdown_outputs_are_dropped() {
        let nb = parse_notebook_str(
            r##"{"cells": [{"cell_type": "markdown", "source": "# T",
                "outputs": [{"output_type": "stream", "text": "x"}]}]}"##,
        )
        .unwrap();
        assert!(nb.cells()[0].outputs.is_empty());
    }

    #[test]
    fn outputs_keep_document_order_and_payloads() {
        let nb = parse_notebook_str(
            r#"{"cells": [{"cell_type": "code", "source": "f()", "execution_count": 4, "outputs": [
                {"output_type": "stream", "name": "stdout", "text": ["one\n", "two\n"]},
                {"output_type": "execute_result", "data": {"text/plain": ["42"]}},
                {"output_type": "error", "ename": "KeyError", "evalue": "'k'", "traceback": ["tb1", "tb2"]},
                "garbage"
            ]}]}"#,
        )
        .unwrap();

        let cell = &nb.cells()[0];
        assert_eq!(cell.execution_count, Some(4));
        assert_eq!(cell.outputs.len(), 3);
        assert_eq!(cell.outputs[0].text.as_deref(), Some("one\ntwo\n"));
        assert_eq!(cell.outputs[1].output_type, OutputType::ExecuteResult);
        assert_eq!(cell.outputs[1].text.as_deref(), Some("42"));
        assert_eq!(cell.outputs[2].error_name.as_deref(), Some("KeyError"));
        assert_eq!(cell.outputs[2].traceback, vec!["tb1", "tb2"]);
    }

    #[test]
    fn metadata_is_extracted_when_present() {
        let nb = parse_notebook_str(
            r#"{"nbformat": 4, "nbformat_minor": 5,
                "metadata": {"kernelspec": {"name": "python3", "language": "python"}},
                "cells": []}"#,
        )
        .unwrap();
        assert_eq!(nb.metadata.nbformat, Some(4));
        assert_eq!(nb.metadata.nbformat_minor, Some(5));
        assert_eq!(nb.metadata.kernel_name.as_deref(), Some("python3"));
        assert_eq!(nb.metadata.language.as_deref(), Some("python"));
    }

    #[test]
    fn rejects_unparseable_top_level() {
        for raw in ["not json", "[1, 2]", r#"{"worksheets": []}"#, r#"{"cells": {}}"#] {
            let err = parse_notebook_str(raw).unwrap_err();
            assert!(
                matches!(err, NotebookError::MalformedDocument(_)),
                "expected malformed for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_notebook(b"{\"cells\": [\xff]}").unwrap_err();
        assert!(matches!(err, NotebookError::Encoding(_)));
    }

    #[test]
    fn decodes_multibyte_text_and_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(
            r#"{"cells": [{"cell_type": "markdown", "source": ["Ünïcødé 数据 🧬\n"]}]}"#.as_bytes(),
        );
        let nb = parse_notebook(&bytes).unwrap();
        assert_eq!(nb.cells()[0].source, vec!["Ünïcødé 数据 🧬\n"]);
    }

    #[test]
    fn reads_from_io_source() {
        let raw = br#"{"cells": [{"cell_type": "code", "source": "x"}]}"#;
        let nb = read_notebook(&raw[..]).unwrap();
        assert_eq!(nb.len(), 1);
    }
}
