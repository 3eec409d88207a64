//! Test providers — membership and messaging fakes.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use wheeltools_core::error::DomainError;
use wheeltools_core::providers::{
    MembershipProvider, MembershipSnapshot, MessagingProvider, Recipient,
};

/// A membership provider returning whatever snapshot the test last set.
#[derive(Debug)]
pub struct StaticMembershipProvider {
    snapshot: Mutex<MembershipSnapshot>,
}

impl StaticMembershipProvider {
    /// Create a provider returning `snapshot`.
    #[must_use]
    pub fn new(snapshot: MembershipSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Replaces the snapshot returned from now on.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set(&self, snapshot: MembershipSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }
}

#[async_trait]
impl MembershipProvider for StaticMembershipProvider {
    async fn snapshot(&self) -> MembershipSnapshot {
        self.snapshot.lock().unwrap().clone()
    }
}

/// A messenger that records every send with the instant it happened.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String, Instant)>>,
}

impl RecordingMessenger {
    /// Returns `(qualified recipient, text)` for every send, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(to, text, _)| (to.clone(), text.clone()))
            .collect()
    }

    /// Returns the instant of every send, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }
}

#[async_trait]
impl MessagingProvider for RecordingMessenger {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_owned(), Instant::now()));
        Ok(())
    }
}

/// A messenger whose channel is always down.
#[derive(Debug)]
pub struct FailingMessenger;

#[async_trait]
impl MessagingProvider for FailingMessenger {
    async fn send(&self, _recipient: &Recipient, _text: &str) -> Result<(), DomainError> {
        Err(DomainError::ProviderUnavailable("chat channel closed".into()))
    }
}
