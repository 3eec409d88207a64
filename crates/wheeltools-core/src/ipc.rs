//! Ports for the remote create-game capability reached over IPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Placeholder shown and stored while a member has no remote game yet. Never
/// a valid id from the backend.
pub const GAME_ID_SENTINEL: &str = "<not created>";

/// Request sent to the game backend. Field names follow the backend's
/// PascalCase contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGameMessage {
    /// Game title; the member's name.
    pub title: String,
    /// Spins available in the game.
    pub max_spins: i32,
    /// Wheel speed.
    pub speed: i32,
    /// Visual theme.
    pub theme: String,
    /// Backend preset.
    pub preset: String,
    /// Whether the game is a test game.
    pub test_game: bool,
}

/// A resolved create-game endpoint.
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Creates a game and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProviderUnavailable` when the backend cannot be
    /// reached, or `DomainError::Infrastructure` when it rejects the request.
    async fn create_game(&self, message: &CreateGameMessage) -> Result<String, DomainError>;
}

/// Locates the backend registered under a channel name.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    /// Resolves `channel` to a backend.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProviderUnavailable` while nothing is registered
    /// on the channel.
    async fn resolve(&self, channel: &str) -> Result<Arc<dyn GameBackend>, DomainError>;
}
