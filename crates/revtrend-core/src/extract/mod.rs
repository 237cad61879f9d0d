//! Tabular extractor: one source document in, one `QuarterlyRecord` per
//! quarter column out.

pub mod pdf;
pub mod table;

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::errors::{RevtrendError, RevtrendResult};
use crate::models::{QuarterlyRecord, TOTAL_KEY};
use crate::normalize::normalize_label;
use crate::quarter::parse_quarter_label;

use table::RawTable;

/// Allowed gap, in currency units, between a stated total and the segment
/// sum before the divergence is worth a warning. Divergence itself is
/// expected (source documents round per segment) and always preserved.
const TOTAL_SUM_TOLERANCE: i64 = 5;

/// Extract all quarter records from the table on `path`'s first page.
///
/// Records come back oldest-first regardless of the document's newest-first
/// column order. Failures are per-document: a batch caller logs the error
/// and moves on to the next file.
pub fn extract(path: &Path) -> RevtrendResult<Vec<QuarterlyRecord>> {
    if !path.exists() {
        return Err(RevtrendError::DocumentNotFound(path.to_path_buf()));
    }

    let text = pdf::first_page_text(path)?;
    let raw = table::parse_table(&text, path)?;
    let records = assemble(raw, path)?;
    debug!(
        path = %path.display(),
        quarters = records.len(),
        "extracted quarterly records"
    );
    Ok(records)
}

/// Turn a located table into chronological records.
///
/// Quarter labels and every row's values are reversed to oldest-first, row
/// labels are normalized into segment keys, and rows whose value count does
/// not match the quarter count are dropped as malformed.
fn assemble(raw: RawTable, path: &Path) -> RevtrendResult<Vec<QuarterlyRecord>> {
    let mut labels = raw.quarter_labels;
    labels.reverse();

    let keys = labels
        .iter()
        .map(|label| {
            parse_quarter_label(label).ok_or_else(|| RevtrendError::QuarterLabel(label.clone()))
        })
        .collect::<RevtrendResult<Vec<(i64, i64)>>>()?;

    let mut per_quarter: Vec<IndexMap<String, i64>> = vec![IndexMap::new(); labels.len()];
    for (label, mut values) in raw.rows {
        values.reverse();
        if values.len() != labels.len() {
            warn!(
                path = %path.display(),
                %label,
                values = values.len(),
                quarters = labels.len(),
                "segment row arity does not match quarter count, skipping"
            );
            continue;
        }
        let key = normalize_label(&label);
        for (segments, value) in per_quarter.iter_mut().zip(&values) {
            segments.insert(key.clone(), *value);
        }
    }

    if per_quarter.iter().all(IndexMap::is_empty) {
        return Err(RevtrendError::EmptyTable(path.to_path_buf()));
    }

    let records = labels
        .into_iter()
        .zip(keys)
        .zip(per_quarter)
        .map(|((quarter_label, (fiscal_year, quarter_number)), segments)| {
            let record = QuarterlyRecord {
                quarter_label,
                fiscal_year,
                quarter_number,
                total_revenue: segments.get(TOTAL_KEY).copied().unwrap_or(0),
                segments,
                imported_at: None,
                source_pdf: None,
            };
            check_total(&record, path);
            record
        })
        .collect();
    Ok(records)
}

/// Non-fatal integrity check: the stated total is kept even when it
/// disagrees with the segment sum beyond rounding.
fn check_total(record: &QuarterlyRecord, path: &Path) {
    if record.total_revenue == 0 {
        return;
    }
    let sum = record.segment_sum();
    if (record.total_revenue - sum).abs() > TOTAL_SUM_TOLERANCE {
        warn!(
            path = %path.display(),
            quarter = %record.quarter_label,
            stated = record.total_revenue,
            segment_sum = sum,
            "stated total diverges from segment sum"
        );
    }
}
