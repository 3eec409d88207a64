//! Configuration repository abstraction.
//!
//! The roster configuration is stored as one versioned JSON document. The
//! repository only moves that document in and out of storage; schema handling
//! lives with the roster crate.

use crate::error::DomainError;

/// Repository trait for loading and saving the persisted configuration document.
///
/// Both operations are synchronous: every roster mutation saves before the
/// mutation returns.
pub trait ConfigRepository: Send + Sync {
    /// Load the stored document, or `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the storage cannot be read or
    /// holds something that is not JSON.
    fn load(&self) -> Result<Option<serde_json::Value>, DomainError>;

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails.
    fn save(&self, document: &serde_json::Value) -> Result<(), DomainError>;
}
