//! Outcome of a batch over the roster.

use serde::Serialize;
use uuid::Uuid;

/// One member that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Member name.
    pub member: String,
    /// Why processing failed.
    pub reason: String,
}

/// Per-member results of a batch. A batch never fails as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Identifier used in the batch's log lines.
    pub batch_id: Uuid,
    /// Members processed successfully, in order.
    pub succeeded: Vec<String>,
    /// Members that failed, in order.
    pub failed: Vec<ItemFailure>,
    /// Members dropped because they left the roster mid-batch.
    pub skipped: Vec<String>,
}

impl BatchReport {
    /// Starts an empty report.
    #[must_use]
    pub fn new(batch_id: Uuid) -> Self {
        Self {
            batch_id,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn succeed(&mut self, member: &str) {
        self.succeeded.push(member.to_owned());
    }

    pub(crate) fn fail(&mut self, member: &str, reason: impl ToString) {
        self.failed.push(ItemFailure {
            member: member.to_owned(),
            reason: reason.to_string(),
        });
    }

    pub(crate) fn skip(&mut self, member: &str) {
        self.skipped.push(member.to_owned());
    }

    /// Number of members attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// `true` when some, but not all, members failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.succeeded.is_empty()
    }
}
