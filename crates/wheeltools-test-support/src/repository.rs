//! Test repositories — mock `ConfigRepository` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use wheeltools_core::error::DomainError;
use wheeltools_core::repository::ConfigRepository;

/// A repository that keeps the last saved document in memory and counts
/// saves, so tests can assert save-after-every-mutation.
#[derive(Debug, Default)]
pub struct InMemoryConfigRepository {
    document: Mutex<Option<serde_json::Value>>,
    saves: Mutex<usize>,
}

impl InMemoryConfigRepository {
    /// Create a repository that already holds `document`.
    #[must_use]
    pub fn with_document(document: serde_json::Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            saves: Mutex::new(0),
        }
    }

    /// Number of `save` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl ConfigRepository for InMemoryConfigRepository {
    fn load(&self) -> Result<Option<serde_json::Value>, DomainError> {
        Ok(self.document.lock().unwrap().clone())
    }

    fn save(&self, document: &serde_json::Value) -> Result<(), DomainError> {
        *self.document.lock().unwrap() = Some(document.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingConfigRepository;

impl ConfigRepository for FailingConfigRepository {
    fn load(&self) -> Result<Option<serde_json::Value>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn save(&self, _document: &serde_json::Value) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}

/// A repository whose saves succeed a fixed number of times and then fail,
/// for exercising save failures after the store has opened.
#[derive(Debug)]
pub struct FlakyConfigRepository {
    remaining: AtomicUsize,
}

impl FlakyConfigRepository {
    /// Create a repository that accepts `saves` saves before failing.
    #[must_use]
    pub fn failing_after(saves: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(saves),
        }
    }
}

impl ConfigRepository for FlakyConfigRepository {
    fn load(&self) -> Result<Option<serde_json::Value>, DomainError> {
        Ok(None)
    }

    fn save(&self, _document: &serde_json::Value) -> Result<(), DomainError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| DomainError::Infrastructure("disk full".into()))
    }
}
