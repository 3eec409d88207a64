//! Lazily connected client for the create-game channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time;
use tracing::{debug, info};
use wheeltools_core::error::DomainError;
use wheeltools_core::ipc::{ChannelResolver, CreateGameMessage, GAME_ID_SENTINEL, GameBackend};

/// Well-known channel the game backend registers under.
pub const CREATE_GAME_CHANNEL: &str = "SimpleWheel.CreateGameIPC";

/// Upper bound on resolving the channel and on each call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the remote create-game operation.
///
/// The backend handle is resolved on the first call and cached. Concurrent
/// first callers wait on the same resolution attempt. A failed resolution is
/// not cached, so the next call tries again.
pub struct IpcClient {
    channel: String,
    resolver: Arc<dyn ChannelResolver>,
    backend: OnceCell<Arc<dyn GameBackend>>,
    timeout: Duration,
}

impl std::fmt::Debug for IpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcClient")
            .field("channel", &self.channel)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl IpcClient {
    /// Creates a client for [`CREATE_GAME_CHANNEL`]. Nothing is resolved yet.
    #[must_use]
    pub fn new(resolver: Arc<dyn ChannelResolver>) -> Self {
        Self::with_channel(resolver, CREATE_GAME_CHANNEL, DEFAULT_CALL_TIMEOUT)
    }

    /// Creates a client for a specific channel and timeout.
    #[must_use]
    pub fn with_channel(
        resolver: Arc<dyn ChannelResolver>,
        channel: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            channel: channel.into(),
            resolver,
            backend: OnceCell::new(),
            timeout,
        }
    }

    /// Returns `true` once the channel has been resolved.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.backend.initialized()
    }

    async fn backend(&self) -> Result<Arc<dyn GameBackend>, DomainError> {
        if let Some(backend) = self.backend.get() {
            return Ok(backend.clone());
        }
        let resolve = self
            .backend
            .get_or_try_init(|| self.resolver.resolve(&self.channel));
        let backend = time::timeout(self.timeout, resolve)
            .await
            .map_err(|_| {
                DomainError::ProviderUnavailable(format!(
                    "timed out resolving {}",
                    self.channel
                ))
            })??;
        info!(channel = %self.channel, "create-game channel resolved");
        Ok(backend.clone())
    }

    /// Creates a game and returns the backend's identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProviderUnavailable` when the channel cannot be
    /// resolved or the call times out, `DomainError::Infrastructure` when the
    /// returned id is blank or the not-created placeholder, and whatever the
    /// backend reports when it rejects the request.
    pub async fn create_game(&self, message: &CreateGameMessage) -> Result<String, DomainError> {
        let backend = self.backend().await?;
        debug!(title = %message.title, "sending create-game request");
        let id = time::timeout(self.timeout, backend.create_game(message))
            .await
            .map_err(|_| {
                DomainError::ProviderUnavailable(format!(
                    "create-game call on {} timed out",
                    self.channel
                ))
            })??;
        if id.trim().is_empty() || id.trim() == GAME_ID_SENTINEL {
            return Err(DomainError::Infrastructure(format!(
                "backend returned no usable game id: {id:?}"
            )));
        }
        Ok(id)
    }
}
