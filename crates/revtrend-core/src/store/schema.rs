//! SQLite schema DDL for the revenue store.

use rusqlite::Connection;

use crate::errors::RevtrendResult;

/// Core DDL statements: 2 CREATE TABLE + 2 CREATE INDEX.
///
/// Executed with `CREATE … IF NOT EXISTS` so they are safe to replay on an
/// already-initialised database; the store applies them on every open.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS quarterly_revenue (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quarter TEXT NOT NULL,
        fiscal_year INTEGER NOT NULL,
        quarter_number INTEGER NOT NULL,
        data_center INTEGER NOT NULL,
        gaming INTEGER NOT NULL,
        professional_visualization INTEGER NOT NULL,
        automotive INTEGER NOT NULL,
        oem_other INTEGER NOT NULL,
        total_revenue INTEGER NOT NULL,
        imported_at TEXT DEFAULT CURRENT_TIMESTAMP,
        source_pdf TEXT,
        UNIQUE(quarter, fiscal_year, quarter_number)
    );",
    "CREATE TABLE IF NOT EXISTS import_metadata (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pdf_filename TEXT UNIQUE NOT NULL,
        imported_at TEXT DEFAULT CURRENT_TIMESTAMP,
        quarters_count INTEGER NOT NULL,
        fiscal_year_max INTEGER NOT NULL
    );",
    "CREATE INDEX IF NOT EXISTS idx_quarterly_revenue_chrono
     ON quarterly_revenue(fiscal_year, quarter_number);",
    "CREATE INDEX IF NOT EXISTS idx_import_metadata_imported
     ON import_metadata(imported_at);",
];

/// Apply the full schema to `conn`.
pub fn apply_schema(conn: &Connection) -> RevtrendResult<()> {
    for stmt in SCHEMA_STATEMENTS {
        conn.execute_batch(stmt)?;
    }
    Ok(())
}
