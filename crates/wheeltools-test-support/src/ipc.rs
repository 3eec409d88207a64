//! Test IPC — scripted game backends and channel resolvers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wheeltools_core::error::DomainError;
use wheeltools_core::ipc::{ChannelResolver, CreateGameMessage, GameBackend};

/// A backend that returns `game-<title>` for every request, except for titles
/// configured to fail. Records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedGameBackend {
    failing_titles: HashSet<String>,
    requests: Mutex<Vec<CreateGameMessage>>,
}

impl ScriptedGameBackend {
    /// Create a backend that rejects requests for the given titles.
    #[must_use]
    pub fn failing_for(titles: &[&str]) -> Self {
        Self {
            failing_titles: titles.iter().map(|t| (*t).to_owned()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<CreateGameMessage> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameBackend for ScriptedGameBackend {
    async fn create_game(&self, message: &CreateGameMessage) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(message.clone());
        if self.failing_titles.contains(&message.title) {
            return Err(DomainError::Infrastructure(format!(
                "backend rejected game for {}",
                message.title
            )));
        }
        Ok(format!("game-{}", message.title))
    }
}

/// A resolver that fails a configured number of times, then resolves every
/// channel to the same backend. Counts resolution attempts.
pub struct StaticChannelResolver {
    backend: Arc<dyn GameBackend>,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl StaticChannelResolver {
    /// Create a resolver that always succeeds.
    #[must_use]
    pub fn new(backend: Arc<dyn GameBackend>) -> Self {
        Self::failing_first(backend, 0)
    }

    /// Create a resolver that reports the channel unavailable for the first
    /// `failures` attempts.
    #[must_use]
    pub fn failing_first(backend: Arc<dyn GameBackend>, failures: usize) -> Self {
        Self {
            backend,
            failures_left: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of `resolve` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelResolver for StaticChannelResolver {
    async fn resolve(&self, channel: &str) -> Result<Arc<dyn GameBackend>, DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DomainError::ProviderUnavailable(format!(
                "{channel} not registered"
            )));
        }
        Ok(self.backend.clone())
    }
}

/// A resolver whose channel never comes up.
#[derive(Debug)]
pub struct UnavailableChannelResolver;

#[async_trait]
impl ChannelResolver for UnavailableChannelResolver {
    async fn resolve(&self, channel: &str) -> Result<Arc<dyn GameBackend>, DomainError> {
        Err(DomainError::ProviderUnavailable(format!(
            "{channel} not registered"
        )))
    }
}
