//! Markdown report generation
//!
//! This module renders a finished run as a human-readable markdown file:
//! run information, per-site results, the download table and the failures.

use crate::output::traits::{OutputResult, ReportSink, RunReport};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Report sink writing a markdown file
pub struct MarkdownReportSink {
    path: PathBuf,
}

impl MarkdownReportSink {
    /// Creates a sink that writes to `path`, replacing any existing file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for MarkdownReportSink {
    fn name(&self) -> &str {
        "markdown"
    }

    fn write_report(&self, report: &RunReport) -> OutputResult<()> {
        write_markdown_report(report, &self.path)
    }
}

/// Writes a markdown report to `output_path`
///
/// Missing parent directories are created.
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# PDF Harvest Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash));

    // Overall statistics
    let stats = &report.stats;
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Sites**: {}\n", report.sites.len()));
    md.push_str(&format!("- **Sites Failed**: {}\n", stats.sites_failed));
    md.push_str(&format!("- **Pages Visited**: {}\n", stats.pages_visited));
    md.push_str(&format!("- **Pages Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!("- **PDF Links Found**: {}\n", stats.pdf_links_found));
    md.push_str(&format!(
        "- **Downloads**: {} succeeded, {} failed\n",
        stats.downloads_succeeded, stats.downloads_failed
    ));
    md.push_str(&format!(
        "- **Download Success Rate**: {:.2}%\n\n",
        stats.download_success_rate()
    ));

    // Per-site breakdown
    if !report.sites.is_empty() {
        md.push_str("## Sites\n\n");
        md.push_str("| Website | Pages | PDF Links | Downloaded | Failed | Status |\n");
        md.push_str("|---------|-------|-----------|------------|--------|--------|\n");
        for site in &report.sites {
            let status = match &site.error {
                Some(error) => format!("error: {}", escape_cell(error)),
                None if site.page_limit_reached => "ok (page limit reached)".to_string(),
                None => "ok".to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                escape_cell(&site.site),
                site.pages_visited,
                site.pdf_links_found,
                site.downloads_succeeded,
                site.downloads_failed,
                status
            ));
        }
        md.push('\n');
    }

    // Download table
    md.push_str("## Downloads\n\n");
    if report.successes().next().is_none() {
        md.push_str("No PDF files were downloaded.\n\n");
    } else {
        md.push_str("| Website | PDF Link | PDF File Name |\n");
        md.push_str("|---------|----------|---------------|\n");
        for record in report.successes() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&record.site),
                escape_cell(&record.pdf_url),
                escape_cell(&record.file_name)
            ));
        }
        md.push('\n');
    }

    // Failures
    if report.failures().next().is_some() {
        md.push_str("## Failed Downloads\n\n");
        md.push_str("| Website | PDF Link | Error |\n");
        md.push_str("|---------|----------|-------|\n");
        for record in report.failures() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&record.site),
                escape_cell(&record.pdf_url),
                escape_cell(record.error().unwrap_or_default())
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Report generated by PDF Harvest on {}*\n",
        report.finished_at.to_rfc3339()
    ));

    md
}

/// Keeps table cells on one line and stops `|` from splitting them
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}
