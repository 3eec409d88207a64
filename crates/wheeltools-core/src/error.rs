//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No member with the given name is tracked.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// A numeric member field holds text that does not parse.
    #[error("invalid {field} for {member}: {value:?} is not an integer")]
    InvalidNumber {
        /// The member whose field is invalid.
        member: String,
        /// The field name (e.g. `spin_count`).
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external provider (IPC channel, membership source, chat) is not reachable.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for conditions that clear up on their own and are only
    /// logged at info level.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }
}
