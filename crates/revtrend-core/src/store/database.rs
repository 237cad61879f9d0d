//! SQLite storage layer for quarterly revenue data.
//!
//! The store owns exactly one connection for its lifetime: opened by the
//! constructor (which also applies the schema idempotently) and released on
//! [`RevenueStore::close`] or drop. Single-writer use only; the natural-key
//! uniqueness constraint is the one concurrency safety net.

use std::path::Path;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use rusqlite::{params, Connection, ErrorCode};
use tracing::{debug, warn};

use crate::errors::RevtrendResult;
use crate::models::{FlatRow, ImportRecord, QuarterlyRecord, SEGMENT_COLUMNS};
use crate::store::schema;

/// Column list shared by every quarterly_revenue SELECT, in the order
/// `row_to_record` reads them back.
const SELECT_COLUMNS: &str = "quarter, fiscal_year, quarter_number, data_center, gaming, \
     professional_visualization, automotive, oem_other, total_revenue, \
     imported_at, source_pdf";

/// SQLite store for per-quarter segment revenue and import provenance.
pub struct RevenueStore {
    conn: Connection,
}

impl RevenueStore {
    /// Open (or create) the store at `path`. Parent directories are created
    /// and both tables are ensured to exist.
    pub fn open<P: AsRef<Path>>(path: P) -> RevtrendResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store, used by tests and benches.
    pub fn open_in_memory() -> RevtrendResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RevtrendResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Release the underlying connection explicitly. Dropping the store has
    /// the same effect; this surfaces any close-time error instead of
    /// discarding it.
    pub fn close(self) -> RevtrendResult<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    // -----------------------------------------------------------------------
    // Upserts
    // -----------------------------------------------------------------------

    /// Insert or replace one quarter by its natural key
    /// `(quarter, fiscal_year, quarter_number)`.
    ///
    /// Two-step contract inside a transaction: attempt the insert, and on a
    /// uniqueness violation replace the full row instead. A duplicate key is
    /// never an error. Returns the number of rows affected: 1, or 0 when the
    /// record is missing a required segment column and is skipped.
    pub fn upsert_quarter(
        &mut self,
        record: &QuarterlyRecord,
        source_pdf: &str,
    ) -> RevtrendResult<usize> {
        let mut column_values = Vec::with_capacity(SEGMENT_COLUMNS.len());
        for (column, aliases) in SEGMENT_COLUMNS {
            match record.column_value(aliases) {
                Some(value) => column_values.push(value),
                None => {
                    warn!(
                        quarter = %record.quarter_label,
                        column,
                        "record is missing a segment column, skipping upsert"
                    );
                    return Ok(0);
                }
            }
        }

        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO quarterly_revenue \
                 (quarter, fiscal_year, quarter_number, data_center, gaming, \
                  professional_visualization, automotive, oem_other, total_revenue, \
                  source_pdf) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                record.quarter_label,
                record.fiscal_year,
                record.quarter_number,
                column_values[0],
                column_values[1],
                column_values[2],
                column_values[3],
                column_values[4],
                record.total_revenue,
                source_pdf,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                // Natural-key conflict: replace the row's values and
                // provenance in full.
                tx.execute(
                    "UPDATE quarterly_revenue SET \
                         data_center = ?1, gaming = ?2, professional_visualization = ?3, \
                         automotive = ?4, oem_other = ?5, total_revenue = ?6, \
                         imported_at = CURRENT_TIMESTAMP, source_pdf = ?7 \
                     WHERE quarter = ?8 AND fiscal_year = ?9 AND quarter_number = ?10;",
                    params![
                        column_values[0],
                        column_values[1],
                        column_values[2],
                        column_values[3],
                        column_values[4],
                        record.total_revenue,
                        source_pdf,
                        record.quarter_label,
                        record.fiscal_year,
                        record.quarter_number,
                    ],
                )?;
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        debug!(quarter = %record.quarter_label, source_pdf, "upserted quarter");
        Ok(1)
    }

    /// Insert or replace the provenance row for one source document,
    /// keyed on filename alone. Same two-step discipline as quarters.
    pub fn upsert_import_metadata(
        &mut self,
        pdf_filename: &str,
        quarters_count: i64,
        fiscal_year_max: i64,
    ) -> RevtrendResult<()> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO import_metadata (pdf_filename, quarters_count, fiscal_year_max) \
             VALUES (?1, ?2, ?3);",
            params![pdf_filename, quarters_count, fiscal_year_max],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                tx.execute(
                    "UPDATE import_metadata SET \
                         imported_at = CURRENT_TIMESTAMP, \
                         quarters_count = ?2, fiscal_year_max = ?3 \
                     WHERE pdf_filename = ?1;",
                    params![pdf_filename, quarters_count, fiscal_year_max],
                )?;
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Retrieval
    // -----------------------------------------------------------------------

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuarterlyRecord> {
        let mut segments = IndexMap::new();
        for (i, (column, _)) in SEGMENT_COLUMNS.iter().enumerate() {
            segments.insert(column.to_string(), row.get::<_, i64>(3 + i)?);
        }
        Ok(QuarterlyRecord {
            quarter_label: row.get(0)?,
            fiscal_year: row.get(1)?,
            quarter_number: row.get(2)?,
            segments,
            total_revenue: row.get(8)?,
            imported_at: row.get::<_, Option<NaiveDateTime>>(9)?,
            source_pdf: row.get(10)?,
        })
    }

    /// All stored quarters, ascending chronological order.
    pub fn list_all(&self) -> RevtrendResult<Vec<QuarterlyRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM quarterly_revenue \
             ORDER BY fiscal_year ASC, quarter_number ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Quarters between two inclusive (fiscal_year, quarter) bounds,
    /// ascending. Comparison is on the composite pair, not calendar dates.
    pub fn list_range(
        &self,
        start_year: i64,
        start_quarter: i64,
        end_year: i64,
        end_quarter: i64,
    ) -> RevtrendResult<Vec<QuarterlyRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM quarterly_revenue \
             WHERE (fiscal_year > ?1 OR (fiscal_year = ?1 AND quarter_number >= ?2)) \
               AND (fiscal_year < ?3 OR (fiscal_year = ?3 AND quarter_number <= ?4)) \
             ORDER BY fiscal_year ASC, quarter_number ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![start_year, start_quarter, end_year, end_quarter],
                Self::row_to_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// The `n` chronologically latest quarters, returned ascending.
    pub fn list_latest(&self, n: i64) -> RevtrendResult<Vec<QuarterlyRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM quarterly_revenue \
             ORDER BY fiscal_year DESC, quarter_number DESC LIMIT ?1;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut records = stmt
            .query_map(params![n], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        records.reverse();
        Ok(records)
    }

    /// Import provenance, most recent first. `imported_at` has one-second
    /// resolution, so rowid breaks ties within a batch.
    pub fn list_import_history(&self) -> RevtrendResult<Vec<ImportRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT pdf_filename, imported_at, quarters_count, fiscal_year_max \
             FROM import_metadata \
             ORDER BY imported_at DESC, id DESC;",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(ImportRecord {
                    pdf_filename: row.get(0)?,
                    imported_at: row.get(1)?,
                    quarters_count: row.get(2)?,
                    fiscal_year_max: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Write every stored quarter to a CSV file: header row of column
    /// names, one row per quarter, chronological order.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> RevtrendResult<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for record in self.list_all()? {
            writer.serialize(FlatRow::from(&record))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write every stored quarter to a JSON file: an array of objects with
    /// stable key order; numeric columns stay numeric.
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> RevtrendResult<()> {
        let rows: Vec<FlatRow> = self.list_all()?.iter().map(FlatRow::from).collect();
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &rows)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, year: i64, quarter: i64, data_center: i64) -> QuarterlyRecord {
        let mut segments = IndexMap::new();
        segments.insert("data_center".to_string(), data_center);
        segments.insert("gaming".to_string(), 200);
        segments.insert("professional_visualization".to_string(), 30);
        segments.insert("auto".to_string(), 20);
        segments.insert("oem_other".to_string(), 10);
        segments.insert("total".to_string(), data_center + 260);
        QuarterlyRecord {
            quarter_label: label.to_string(),
            fiscal_year: year,
            quarter_number: quarter,
            segments,
            total_revenue: data_center + 260,
            imported_at: None,
            source_pdf: None,
        }
    }

    fn row_count(store: &RevenueStore) -> i64 {
        store
            .conn
            .query_row("SELECT COUNT(*) FROM quarterly_revenue;", [], |r| r.get(0))
            .unwrap()
    }

    /// Re-importing the same natural key replaces the row; re-importing the
    /// same data under a different source filename does not grow the table.
    #[test]
    fn upsert_is_idempotent() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        let rec = record("Q1 FY24", 2024, 1, 1000);

        assert_eq!(store.upsert_quarter(&rec, "q124.pdf").unwrap(), 1);
        assert_eq!(store.upsert_quarter(&rec, "q124.pdf").unwrap(), 1);
        assert_eq!(row_count(&store), 1);

        let updated = record("Q1 FY24", 2024, 1, 1111);
        assert_eq!(store.upsert_quarter(&updated, "q224.pdf").unwrap(), 1);
        assert_eq!(row_count(&store), 1);

        let stored = &store.list_all().unwrap()[0];
        assert_eq!(stored.segment("data_center"), Some(1111));
        assert_eq!(stored.source_pdf.as_deref(), Some("q224.pdf"));
        assert!(stored.imported_at.is_some());
    }

    #[test]
    fn records_missing_a_segment_are_skipped() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        let mut rec = record("Q1 FY24", 2024, 1, 1000);
        rec.segments.shift_remove("gaming");
        assert_eq!(store.upsert_quarter(&rec, "q124.pdf").unwrap(), 0);
        assert_eq!(row_count(&store), 0);
    }

    /// Insertion order never affects retrieval order.
    #[test]
    fn list_all_is_chronological() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        store
            .upsert_quarter(&record("Q2 FY24", 2024, 2, 2000), "q224.pdf")
            .unwrap();
        store
            .upsert_quarter(&record("Q1 FY24", 2024, 1, 1000), "q224.pdf")
            .unwrap();

        let labels: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.quarter_label)
            .collect();
        assert_eq!(labels, vec!["Q1 FY24", "Q2 FY24"]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        for (label, quarter) in [("Q1 FY24", 1), ("Q2 FY24", 2), ("Q3 FY24", 3)] {
            store
                .upsert_quarter(&record(label, 2024, quarter, 1000), "q324.pdf")
                .unwrap();
        }

        let labels: Vec<String> = store
            .list_range(2024, 2, 2024, 3)
            .unwrap()
            .into_iter()
            .map(|r| r.quarter_label)
            .collect();
        assert_eq!(labels, vec!["Q2 FY24", "Q3 FY24"]);
    }

    #[test]
    fn range_crosses_fiscal_year_boundaries() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        store
            .upsert_quarter(&record("Q4 FY24", 2024, 4, 1000), "a.pdf")
            .unwrap();
        store
            .upsert_quarter(&record("Q1 FY25", 2025, 1, 2000), "b.pdf")
            .unwrap();
        store
            .upsert_quarter(&record("Q2 FY25", 2025, 2, 3000), "b.pdf")
            .unwrap();

        let labels: Vec<String> = store
            .list_range(2024, 4, 2025, 1)
            .unwrap()
            .into_iter()
            .map(|r| r.quarter_label)
            .collect();
        assert_eq!(labels, vec!["Q4 FY24", "Q1 FY25"]);
    }

    /// Latest-N returns the chronologically latest rows in ascending order.
    #[test]
    fn list_latest_ascends() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        for (label, year, quarter) in [
            ("Q4 FY24", 2024, 4),
            ("Q1 FY25", 2025, 1),
            ("Q2 FY25", 2025, 2),
        ] {
            store
                .upsert_quarter(&record(label, year, quarter, 1000), "x.pdf")
                .unwrap();
        }

        let labels: Vec<String> = store
            .list_latest(2)
            .unwrap()
            .into_iter()
            .map(|r| r.quarter_label)
            .collect();
        assert_eq!(labels, vec!["Q1 FY25", "Q2 FY25"]);
    }

    #[test]
    fn import_history_replaces_by_filename() {
        let mut store = RevenueStore::open_in_memory().unwrap();
        store.upsert_import_metadata("q124.pdf", 5, 2024).unwrap();
        store.upsert_import_metadata("q224.pdf", 6, 2024).unwrap();
        store.upsert_import_metadata("q124.pdf", 7, 2025).unwrap();

        let history = store.list_import_history().unwrap();
        assert_eq!(history.len(), 2);

        let q124 = history
            .iter()
            .find(|r| r.pdf_filename == "q124.pdf")
            .unwrap();
        assert_eq!(q124.quarters_count, 7);
        assert_eq!(q124.fiscal_year_max, 2025);
    }

    #[test]
    fn exports_cover_every_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RevenueStore::open_in_memory().unwrap();
        store
            .upsert_quarter(&record("Q1 FY24", 2024, 1, 1000), "q124.pdf")
            .unwrap();

        let csv_path = dir.path().join("out.csv");
        store.export_csv(&csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let header = csv_text.lines().next().unwrap();
        assert_eq!(
            header,
            "quarter,fiscal_year,quarter_number,data_center,gaming,\
             professional_visualization,automotive,oem_other,total_revenue,\
             imported_at,source_pdf"
        );
        assert_eq!(csv_text.lines().count(), 2);

        let json_path = dir.path().join("out.json");
        store.export_json(&json_path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["data_center"].is_i64());
        assert_eq!(rows[0]["quarter"], "Q1 FY24");
        assert_eq!(rows[0]["source_pdf"], "q124.pdf");
    }

    #[test]
    fn open_creates_parent_dirs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("revenue.db");

        let mut store = RevenueStore::open(&db_path).unwrap();
        store
            .upsert_quarter(&record("Q1 FY24", 2024, 1, 1000), "q124.pdf")
            .unwrap();
        store.close().unwrap();

        let reopened = RevenueStore::open(&db_path).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 1);
    }
}
