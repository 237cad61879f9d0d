//! Document locator: finds revenue report PDFs on disk.
//!
//! The core never downloads anything; callers hand it a directory of
//! already-fetched reports (or one explicit file) and the locator picks
//! candidates by the quarter code embedded in each filename.

use std::path::{Path, PathBuf};

use crate::errors::{RevtrendError, RevtrendResult};
use crate::quarter::{parse_quarter_key, QuarterKey};

fn file_quarter_key(path: &Path) -> QuarterKey {
    path.file_name()
        .map(|name| parse_quarter_key(&name.to_string_lossy()))
        .unwrap_or(QuarterKey::SENTINEL)
}

/// All PDF files directly inside `dir`, ordered oldest-first by the quarter
/// key in their filename. Files without a recognizable quarter code sort
/// first (sentinel key) but are still returned, so a batch import can
/// attempt them and report their failure individually.
pub fn list_documents(dir: &Path) -> RevtrendResult<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort_by_key(|path| (file_quarter_key(path), path.clone()));
    Ok(pdfs)
}

/// The chronologically latest report in `dir`.
pub fn latest_document(dir: &Path) -> RevtrendResult<PathBuf> {
    list_documents(dir)?
        .into_iter()
        .max_by_key(|path| file_quarter_key(path))
        .ok_or_else(|| RevtrendError::DocumentNotFound(dir.to_path_buf()))
}

/// Resolve a caller-supplied path: a file is taken as-is, a directory
/// yields its latest report.
pub fn resolve(path: &Path) -> RevtrendResult<PathBuf> {
    if path.is_dir() {
        latest_document(path)
    } else if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(RevtrendError::DocumentNotFound(path.to_path_buf()))
    }
}
