//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ReportStore trait.

use crate::output::SiteSummary;
use crate::state::DownloadRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ReportStore, StorageError, StorageResult};
use crate::storage::{DownloadRow, RunRecord, RunTotals};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite report store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// Missing parent directories are created.
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, sites, pages_visited, \
                           pages_failed, pdf_links_found";

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        sites: row.get::<_, i64>(4)? as u64,
        pages_visited: row.get::<_, i64>(5)? as u64,
        pages_failed: row.get::<_, i64>(6)? as u64,
        pdf_links_found: row.get::<_, i64>(7)? as u64,
    })
}

impl ReportStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, started_at: &str, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![started_at, config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        finished_at: &str,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, sites = ?2, pages_visited = ?3,
             pages_failed = ?4, pdf_links_found = ?5 WHERE id = ?6",
            params![
                finished_at,
                totals.sites as i64,
                totals.pages_visited as i64,
                totals.pages_failed as i64,
                totals.pdf_links_found as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    // ===== Sites =====

    fn insert_site_summary(&mut self, run_id: i64, summary: &SiteSummary) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO site_runs (run_id, website, origin, pages_visited, pages_failed,
             pdf_links_found, downloads_succeeded, downloads_failed, peak_downloads_in_flight,
             page_limit_reached, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                run_id,
                summary.site,
                summary.origin,
                summary.pages_visited as i64,
                summary.pages_failed as i64,
                summary.pdf_links_found as i64,
                summary.downloads_succeeded as i64,
                summary.downloads_failed as i64,
                summary.peak_downloads_in_flight as i64,
                summary.page_limit_reached,
                summary.error
            ],
        )?;
        Ok(())
    }

    fn get_site_summaries(&self, run_id: i64) -> StorageResult<Vec<SiteSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT website, origin, pages_visited, pages_failed, pdf_links_found,
             downloads_succeeded, downloads_failed, peak_downloads_in_flight,
             page_limit_reached, error
             FROM site_runs WHERE run_id = ?1 ORDER BY id",
        )?;

        let summaries = stmt
            .query_map(params![run_id], |row| {
                Ok(SiteSummary {
                    site: row.get(0)?,
                    origin: row.get(1)?,
                    pages_visited: row.get::<_, i64>(2)? as u64,
                    pages_failed: row.get::<_, i64>(3)? as u64,
                    pdf_links_found: row.get::<_, i64>(4)? as u64,
                    downloads_succeeded: row.get::<_, i64>(5)? as u64,
                    downloads_failed: row.get::<_, i64>(6)? as u64,
                    peak_downloads_in_flight: row.get::<_, i64>(7)? as u64,
                    page_limit_reached: row.get(8)?,
                    error: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    // ===== Downloads =====

    fn insert_downloads(
        &mut self,
        run_id: i64,
        records: &[DownloadRecord],
    ) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO downloads (run_id, website, pdf_link, pdf_file_name, status,
                 error, bytes, completed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                stmt.execute(params![
                    run_id,
                    record.site,
                    record.pdf_url,
                    record.file_name,
                    record.outcome.to_db_string(),
                    record.error(),
                    record.bytes().map(|b| b as i64),
                    record.completed_at.to_rfc3339()
                ])?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn get_downloads(&self, run_id: i64) -> StorageResult<Vec<DownloadRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, website, pdf_link, pdf_file_name, status, error, bytes,
             completed_at FROM downloads WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(DownloadRow {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    website: row.get(2)?,
                    pdf_link: row.get(3)?,
                    pdf_file_name: row.get(4)?,
                    status: row.get(5)?,
                    error: row.get(6)?,
                    bytes: row.get::<_, Option<i64>>(7)?.map(|b| b as u64),
                    completed_at: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    // ===== Statistics =====

    fn count_downloads_by_status(&self, run_id: i64, status: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM downloads WHERE run_id = ?1 AND status = ?2",
            params![run_id, status],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn successful_downloads_by_site(&self, run_id: i64) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT website, COUNT(*) AS total FROM downloads
             WHERE run_id = ?1 AND status = 'success'
             GROUP BY website ORDER BY total DESC, website",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
