//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the PDF Harvest report database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per harvest run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    sites INTEGER NOT NULL DEFAULT 0,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    pdf_links_found INTEGER NOT NULL DEFAULT 0
);

-- Outcome of each site within a run
CREATE TABLE IF NOT EXISTS site_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    website TEXT NOT NULL,
    origin TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    pdf_links_found INTEGER NOT NULL DEFAULT 0,
    downloads_succeeded INTEGER NOT NULL DEFAULT 0,
    downloads_failed INTEGER NOT NULL DEFAULT 0,
    peak_downloads_in_flight INTEGER NOT NULL DEFAULT 0,
    page_limit_reached INTEGER NOT NULL DEFAULT 0,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_site_runs_run ON site_runs(run_id);

-- Provenance of every download attempt
CREATE TABLE IF NOT EXISTS downloads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    website TEXT NOT NULL,
    pdf_link TEXT NOT NULL,
    pdf_file_name TEXT NOT NULL,
    status TEXT NOT NULL,
    error TEXT,
    bytes INTEGER,
    completed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_downloads_run ON downloads(run_id);
CREATE INDEX IF NOT EXISTS idx_downloads_status ON downloads(run_id, status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
