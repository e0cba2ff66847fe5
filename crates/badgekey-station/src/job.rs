//! The ephemeral print job.

use badgekey_core::ScanRecord;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// One scan record on its way through the print pipeline.
///
/// Lives from a successful resolve until the pipeline returns to idle; it is
/// never stored.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: Uuid,
    pub record: ScanRecord,
    pub started_at: Instant,
}

impl PrintJob {
    pub fn new(record: ScanRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
