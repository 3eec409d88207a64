//! Chat commands queued for the host to execute.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::warn;
use wheeltools_core::error::DomainError;
use wheeltools_core::providers::{MessagingProvider, Recipient};

/// Oldest commands are dropped once this many are waiting.
pub const OUTBOX_CAPACITY: usize = 256;

/// Messenger that turns each send into a `/tell` command the host drains.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<VecDeque<String>>,
}

impl Outbox {
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Takes every queued command, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    /// Number of commands waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl MessagingProvider for Outbox {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DomainError> {
        if text.contains('\n') {
            return Err(DomainError::Validation(
                "chat messages cannot span lines".to_owned(),
            ));
        }
        let mut pending = self.lock();
        if pending.len() >= OUTBOX_CAPACITY {
            if let Some(dropped) = pending.pop_front() {
                warn!(command = %dropped, "outbox full, dropping oldest command");
            }
        }
        pending.push_back(format!("/tell {recipient} {text}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wheeltools_core::error::DomainError;
    use wheeltools_core::providers::{MessagingProvider, Recipient};

    use super::{OUTBOX_CAPACITY, Outbox};

    #[tokio::test]
    async fn test_send_queues_tell_commands_in_order() {
        // Arrange
        let outbox = Outbox::default();

        // Act
        outbox
            .send(&Recipient::new("Alys Tern", Some("Lich".into())), "hello")
            .await
            .unwrap();
        outbox
            .send(&Recipient::new("Brom Hale", None), "there")
            .await
            .unwrap();

        // Assert
        assert_eq!(
            outbox.drain(),
            vec!["/tell Alys Tern@Lich hello", "/tell Brom Hale there"]
        );
        assert!(outbox.is_empty());
    }

    #[tokio::test]
    async fn test_multiline_text_is_rejected() {
        let outbox = Outbox::default();

        let result = outbox
            .send(&Recipient::new("Alys Tern", None), "a\nb")
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(outbox.len(), 0);
    }

    #[tokio::test]
    async fn test_full_outbox_drops_oldest() {
        let outbox = Outbox::default();
        let recipient = Recipient::new("Alys Tern", None);

        for i in 0..=OUTBOX_CAPACITY {
            outbox.send(&recipient, &i.to_string()).await.unwrap();
        }

        let drained = outbox.drain();
        assert_eq!(drained.len(), OUTBOX_CAPACITY);
        assert_eq!(drained[0], "/tell Alys Tern 1");
    }
}
