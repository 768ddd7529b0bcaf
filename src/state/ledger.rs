use crate::state::DownloadRecord;
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only, shareable collection of download records
///
/// Cloning a ledger yields another handle to the same records, so a single
/// ledger can be handed to every site task and download worker and read
/// back once by the coordinator. Records appear in completion order, which
/// is not deterministic across concurrent workers.
#[derive(Debug, Clone, Default)]
pub struct DownloadLedger {
    records: Arc<Mutex<Vec<DownloadRecord>>>,
}

impl DownloadLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record
    pub fn append(&self, record: DownloadRecord) {
        self.lock().push(record);
    }

    /// Number of records appended so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no record has been appended
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies out the current records
    pub fn snapshot(&self) -> Vec<DownloadRecord> {
        self.lock().clone()
    }

    // Appends are a single push; a poisoned lock still guards a whole Vec
    fn lock(&self) -> MutexGuard<'_, Vec<DownloadRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
