//! PDF text access for the extractor.

use std::path::Path;

use crate::errors::{RevtrendError, RevtrendResult};

/// Extract the text of the document's first page.
///
/// pdf-extract separates pages with form-feed characters; only the first
/// non-empty page is relevant, since the revenue table always lives there.
pub fn first_page_text(path: &Path) -> RevtrendResult<String> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RevtrendError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let first = text
        .split('\u{0c}')
        .find(|page| !page.trim().is_empty())
        .unwrap_or("");
    Ok(first.to_string())
}
