//! Batch import: every report in a directory, one at a time, with
//! per-document outcomes and an aggregate count.

use std::path::Path;

use tracing::{info, warn};

use crate::errors::{RevtrendError, RevtrendResult};
use crate::extract;
use crate::locator;
use crate::store::RevenueStore;

/// What happened to one source document.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub filename: String,
    /// Rows upserted on success; the per-document error otherwise.
    pub result: Result<usize, RevtrendError>,
}

/// Aggregate result of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub rows_upserted: usize,
    pub failures: usize,
}

impl BatchReport {
    pub fn documents_processed(&self) -> usize {
        self.outcomes.len()
    }
}

/// Extract one document and upsert its quarters plus a provenance row.
///
/// Returns the number of quarter rows affected. The provenance row records
/// how many quarter columns the document carried and the newest fiscal year
/// among them, keyed on the bare filename.
pub fn import_document(store: &mut RevenueStore, path: &Path) -> RevtrendResult<usize> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let records = extract::extract(path)?;
    let mut rows = 0;
    for record in &records {
        rows += store.upsert_quarter(record, &filename)?;
    }

    let fiscal_year_max = records.iter().map(|r| r.fiscal_year).max().unwrap_or(0);
    store.upsert_import_metadata(&filename, records.len() as i64, fiscal_year_max)?;
    Ok(rows)
}

/// Import every PDF in `dir`, oldest report first.
///
/// One document's failure never aborts the batch: the error is logged,
/// recorded in the report, and the run moves on to the next file.
pub fn import_directory(store: &mut RevenueStore, dir: &Path) -> RevtrendResult<BatchReport> {
    let documents = locator::list_documents(dir)?;
    let mut report = BatchReport::default();

    for path in documents {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let result = import_document(store, &path);
        match &result {
            Ok(rows) => {
                info!(%filename, rows, "imported document");
                report.rows_upserted += rows;
            }
            Err(e) => {
                warn!(%filename, error = %e, "failed to import document");
                report.failures += 1;
            }
        }
        report.outcomes.push(DocumentOutcome { filename, result });
    }

    info!(
        documents = report.documents_processed(),
        rows = report.rows_upserted,
        failures = report.failures,
        "batch import complete"
    );
    Ok(report)
}
