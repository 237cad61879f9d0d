//! Shared typed models used across extraction, storage, and export layers.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

use crate::quarter::QuarterKey;

// ---------------------------------------------------------------------------
// Segment column mapping
// ---------------------------------------------------------------------------

/// Fixed store columns and the normalized segment keys that feed them.
///
/// Short-form labels produce alternate keys (the original reports label the
/// automotive segment either "Automotive" or "Auto"), so each column carries
/// its accepted aliases.
pub const SEGMENT_COLUMNS: &[(&str, &[&str])] = &[
    ("data_center", &["data_center"]),
    ("gaming", &["gaming"]),
    ("professional_visualization", &["professional_visualization"]),
    ("automotive", &["automotive", "auto"]),
    ("oem_other", &["oem_other"]),
];

/// Segment key holding the report's own stated total.
pub const TOTAL_KEY: &str = "total";

// ---------------------------------------------------------------------------
// QuarterlyRecord
// ---------------------------------------------------------------------------

/// One fiscal quarter's revenue breakdown.
///
/// `total_revenue` comes from the table's own "total" row and may diverge
/// from the segment sum due to rounding in the source document; the
/// divergence is preserved, never corrected.
#[derive(Clone, Debug, PartialEq)]
pub struct QuarterlyRecord {
    /// Display form preserved verbatim, e.g. `"Q3 FY24"`.
    pub quarter_label: String,
    pub fiscal_year: i64,
    /// 1 through 4.
    pub quarter_number: i64,
    /// Normalized segment key -> revenue in whole currency units, in the
    /// order the rows appeared in the source table.
    pub segments: IndexMap<String, i64>,
    pub total_revenue: i64,
    /// Set on records read back from the store; `None` on freshly
    /// extracted ones.
    pub imported_at: Option<NaiveDateTime>,
    pub source_pdf: Option<String>,
}

impl QuarterlyRecord {
    /// Natural chronological key.
    pub fn key(&self) -> QuarterKey {
        QuarterKey::new(self.fiscal_year, self.quarter_number)
    }

    pub fn segment(&self, key: &str) -> Option<i64> {
        self.segments.get(key).copied()
    }

    /// Look up the value feeding a store column, trying each accepted alias.
    pub fn column_value(&self, aliases: &[&str]) -> Option<i64> {
        aliases.iter().find_map(|key| self.segment(key))
    }

    /// Sum of all segment values, excluding the stated total itself.
    pub fn segment_sum(&self) -> i64 {
        self.segments
            .iter()
            .filter(|(key, _)| key.as_str() != TOTAL_KEY)
            .map(|(_, value)| value)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// ImportRecord
// ---------------------------------------------------------------------------

/// Provenance of one ingested document; one row per distinct filename.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportRecord {
    pub pdf_filename: String,
    pub imported_at: NaiveDateTime,
    /// Quarter columns found in the document.
    pub quarters_count: i64,
    /// Maximum fiscal year among the document's quarter columns.
    pub fiscal_year_max: i64,
}

// ---------------------------------------------------------------------------
// FlatRow
// ---------------------------------------------------------------------------

/// Flattened export shape mirroring the `quarterly_revenue` table.
///
/// Field declaration order is the canonical column order for both export
/// formats; serde emits struct fields in that order, which gives the JSON
/// export its stable key order and the CSV export its header row.
#[derive(Clone, Debug, Serialize)]
pub struct FlatRow {
    pub quarter: String,
    pub fiscal_year: i64,
    pub quarter_number: i64,
    pub data_center: i64,
    pub gaming: i64,
    pub professional_visualization: i64,
    pub automotive: i64,
    pub oem_other: i64,
    pub total_revenue: i64,
    pub imported_at: Option<String>,
    pub source_pdf: Option<String>,
}

impl From<&QuarterlyRecord> for FlatRow {
    fn from(record: &QuarterlyRecord) -> Self {
        Self {
            quarter: record.quarter_label.clone(),
            fiscal_year: record.fiscal_year,
            quarter_number: record.quarter_number,
            data_center: record.segment("data_center").unwrap_or(0),
            gaming: record.segment("gaming").unwrap_or(0),
            professional_visualization: record
                .segment("professional_visualization")
                .unwrap_or(0),
            automotive: record.column_value(&["automotive", "auto"]).unwrap_or(0),
            oem_other: record.segment("oem_other").unwrap_or(0),
            total_revenue: record.total_revenue,
            imported_at: record
                .imported_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            source_pdf: record.source_pdf.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> QuarterlyRecord {
        let mut segments = IndexMap::new();
        segments.insert("data_center".to_string(), 22563);
        segments.insert("gaming".to_string(), 2647);
        segments.insert("professional_visualization".to_string(), 427);
        segments.insert("auto".to_string(), 329);
        segments.insert("oem_other".to_string(), 78);
        segments.insert("total".to_string(), 26044);
        QuarterlyRecord {
            quarter_label: "Q1 FY25".to_string(),
            fiscal_year: 2025,
            quarter_number: 1,
            segments,
            total_revenue: 26044,
            imported_at: None,
            source_pdf: Some("Rev_by_Mkt_Qtrly_Trend_Q125.pdf".to_string()),
        }
    }

    #[test]
    fn key_uses_year_then_quarter() {
        assert_eq!(sample_record().key(), QuarterKey::new(2025, 1));
    }

    #[test]
    fn column_value_falls_back_to_alias() {
        let record = sample_record();
        assert_eq!(record.column_value(&["automotive", "auto"]), Some(329));
        assert_eq!(record.column_value(&["gaming"]), Some(2647));
        assert_eq!(record.column_value(&["missing"]), None);
    }

    #[test]
    fn segment_sum_excludes_total() {
        assert_eq!(sample_record().segment_sum(), 22563 + 2647 + 427 + 329 + 78);
    }

    #[test]
    fn flat_row_carries_every_column() {
        let row = FlatRow::from(&sample_record());
        assert_eq!(row.quarter, "Q1 FY25");
        assert_eq!(row.automotive, 329);
        assert_eq!(row.total_revenue, 26044);
        assert_eq!(row.imported_at, None);

        // Numeric fields stay numeric in the structured export.
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["data_center"].is_i64());
        assert_eq!(json["source_pdf"], "Rev_by_Mkt_Qtrly_Trend_Q125.pdf");
    }
}
