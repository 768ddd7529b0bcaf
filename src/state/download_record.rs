use chrono::{DateTime, Utc};

/// Result of a single download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was written to disk
    Success {
        /// Number of bytes written
        bytes: u64,
    },

    /// The download or the write failed
    Failed {
        /// Error description
        error: String,
    },
}

impl DownloadOutcome {
    /// Returns true if the file was written
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts the outcome to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Provenance of one PDF download
///
/// Produced by the download scheduler and consumed by the report sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Entry URL of the site the PDF was found on
    pub site: String,

    /// Origin of that site
    pub site_origin: String,

    /// The PDF URL
    pub pdf_url: String,

    /// Name of the file in the destination folder
    pub file_name: String,

    pub outcome: DownloadOutcome,

    /// When the attempt finished
    pub completed_at: DateTime<Utc>,
}

impl DownloadRecord {
    /// Returns true if the file was written
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Bytes written, for successful downloads
    pub fn bytes(&self) -> Option<u64> {
        match &self.outcome {
            DownloadOutcome::Success { bytes } => Some(*bytes),
            DownloadOutcome::Failed { .. } => None,
        }
    }

    /// Error description, for failed downloads
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            DownloadOutcome::Success { .. } => None,
            DownloadOutcome::Failed { error } => Some(error),
        }
    }
}
