//! Line-level table parsing: cells, row classification, money values.
//!
//! Extracted page text keeps the table's visual layout: columns are
//! separated by tabs or runs of spaces. Each line is classified through an
//! explicit row schema instead of positional untyped indexing, so malformed
//! rows can be skipped without derailing the rest of the table.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::errors::{RevtrendError, RevtrendResult};
use crate::quarter::parse_quarter_label;

/// Column separator: a tab or a run of two or more whitespace characters.
/// Single spaces stay inside a cell ("Data Center" is one cell).
static CELL_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t|\s{2,}").unwrap());

/// One classified table line.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Quarter labels in document order (newest first); the leading
    /// row-label header cell has already been discarded.
    Header(Vec<String>),
    /// A segment row: raw label plus its money values in document order.
    /// Empty cells never reach this point, so `values` may be shorter than
    /// the quarter count; the assembler treats that as a malformed row.
    Data { label: String, values: Vec<i64> },
    /// Table-shaped but unparseable; skipped with a warning.
    Malformed,
}

/// A located table: header labels plus surviving data rows, document order.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub quarter_labels: Vec<String>,
    pub rows: Vec<(String, Vec<i64>)>,
}

/// Split one line into trimmed, non-empty cells.
pub fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR_RE
        .split(line)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a currency cell of the form `$12,345` or `12345`.
///
/// Returns `None` for anything that is not a plain integer once `$` and
/// thousands separators are stripped (dashes, percentages, prose).
pub fn parse_money(cell: &str) -> Option<i64> {
    let cleaned: String = cell.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Classify a table-shaped line (two or more cells).
pub fn classify_row(cells: &[String]) -> Row {
    if cells.len() < 2 {
        return Row::Malformed;
    }

    // Header: every cell after the discarded corner cell is a quarter label.
    if cells[1..]
        .iter()
        .all(|cell| parse_quarter_label(cell).is_some())
    {
        return Row::Header(cells[1..].to_vec());
    }

    // Data: a non-numeric label followed by money cells only.
    if parse_money(&cells[0]).is_none() {
        let values: Vec<i64> = cells[1..].iter().filter_map(|c| parse_money(c)).collect();
        if values.len() == cells.len() - 1 {
            return Row::Data {
                label: cells[0].clone(),
                values,
            };
        }
    }

    Row::Malformed
}

/// Locate and parse the first table on the page.
///
/// Lines with fewer than two cells are surrounding prose and are ignored.
/// The first header-shaped line starts the table; every later table-shaped
/// line is classified, and malformed ones are skipped without aborting.
pub fn parse_table(text: &str, path: &Path) -> RevtrendResult<RawTable> {
    let mut quarter_labels: Option<Vec<String>> = None;
    let mut rows: Vec<(String, Vec<i64>)> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() < 2 {
            continue;
        }

        match quarter_labels {
            None => {
                if let Row::Header(labels) = classify_row(&cells) {
                    quarter_labels = Some(labels);
                }
            }
            Some(_) => match classify_row(&cells) {
                Row::Data { label, values } => rows.push((label, values)),
                Row::Header(_) => {} // repeated header fragment, ignore
                Row::Malformed => {
                    warn!(path = %path.display(), line, "skipping malformed table row");
                }
            },
        }
    }

    let quarter_labels =
        quarter_labels.ok_or_else(|| RevtrendError::NoTableFound(path.to_path_buf()))?;
    if rows.is_empty() {
        return Err(RevtrendError::EmptyTable(path.to_path_buf()));
    }

    Ok(RawTable {
        quarter_labels,
        rows,
    })
}
