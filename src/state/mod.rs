//! State module for download provenance
//!
//! # Components
//!
//! - `DownloadRecord`: Provenance of one download attempt (site, link, saved file, outcome)
//! - `DownloadLedger`: Concurrency-safe accumulator the workers append records to

mod download_record;
mod ledger;

// Re-export main types
pub use download_record::{DownloadOutcome, DownloadRecord};
pub use ledger::DownloadLedger;
