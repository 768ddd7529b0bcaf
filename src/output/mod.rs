//! Output module for run reports and statistics
//!
//! This module handles:
//! - The report sink interface the coordinator flushes a finished run into
//! - The SQLite and markdown report sinks
//! - Live run counters and the statistics view of stored runs

mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, write_markdown_report, MarkdownReportSink};
pub use sqlite_output::{persist_report, SqliteReportSink};
pub use stats::{load_statistics, print_statistics, HarvestStatistics, RunStats, StatsSnapshot};
pub use traits::{OutputError, OutputResult, ReportSink, RunReport, SiteSummary};

use crate::config::OutputConfig;

/// Builds the report sinks named by the output configuration
pub fn sinks_from_config(config: &OutputConfig) -> Vec<Box<dyn ReportSink>> {
    vec![
        Box::new(SqliteReportSink::new(&config.database_path)),
        Box::new(MarkdownReportSink::new(&config.summary_path)),
    ]
}
