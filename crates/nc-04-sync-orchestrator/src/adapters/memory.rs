//! In-process backlog for tests and embedding.

use crate::domain::SourceError;
use crate::ports::ComplaintSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ComplaintRecord;

/// Backlog held in memory.
#[derive(Default)]
pub struct InMemorySource {
    complaints: RwLock<Vec<ComplaintRecord>>,
    failure: RwLock<Option<String>>,
}

impl InMemorySource {
    /// Source listing `complaints` in order.
    #[must_use]
    pub fn new(complaints: Vec<ComplaintRecord>) -> Self {
        Self {
            complaints: RwLock::new(complaints),
            failure: RwLock::new(None),
        }
    }

    /// Replaces the backlog.
    pub fn replace(&self, complaints: Vec<ComplaintRecord>) {
        *self.complaints.write() = complaints;
    }

    /// Appends one complaint.
    pub fn push(&self, complaint: ComplaintRecord) {
        self.complaints.write().push(complaint);
    }

    /// Makes listings fail with `reason` until cleared with `None`.
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.write() = reason;
    }
}

#[async_trait]
impl ComplaintSource for InMemorySource {
    async fn list_complaints(&self) -> Result<Vec<ComplaintRecord>, SourceError> {
        if let Some(reason) = self.failure.read().clone() {
            return Err(SourceError::Http(reason));
        }
        Ok(self.complaints.read().clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
