//! TCP transport: one JSON line per request, one JSON line per reply.
//!
//! Request: `{"channel": "...", "message": {"Title": ..., ...}}`.
//! Reply: `{"game_id": "..."}` on success, `{"error": "..."}` on failure.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;
use tracing::debug;
use wheeltools_core::error::DomainError;
use wheeltools_core::ipc::{ChannelResolver, CreateGameMessage, GameBackend};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Wire request.
#[derive(Debug, Serialize, Deserialize)]
pub struct IpcRequest {
    /// Channel the request is addressed to.
    pub channel: String,
    /// Request payload.
    pub message: CreateGameMessage,
}

/// Wire reply.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpcReply {
    /// The game was created.
    Created {
        /// Assigned identifier.
        game_id: String,
    },
    /// The backend refused the request.
    Failed {
        /// Reason given by the backend.
        error: String,
    },
}

/// Resolves channels to TCP endpoints registered up front.
///
/// A channel resolves only while something accepts connections on its
/// address, so a backend that starts late is picked up on a later call.
#[derive(Debug, Clone, Default)]
pub struct TcpChannelResolver {
    endpoints: HashMap<String, SocketAddr>,
}

impl TcpChannelResolver {
    /// Creates a resolver with no endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `addr` for `channel`.
    #[must_use]
    pub fn register(mut self, channel: impl Into<String>, addr: SocketAddr) -> Self {
        self.endpoints.insert(channel.into(), addr);
        self
    }
}

#[async_trait]
impl ChannelResolver for TcpChannelResolver {
    async fn resolve(&self, channel: &str) -> Result<Arc<dyn GameBackend>, DomainError> {
        let addr = *self.endpoints.get(channel).ok_or_else(|| {
            DomainError::ProviderUnavailable(format!("no endpoint registered for {channel}"))
        })?;
        connect(addr, DEFAULT_CONNECT_TIMEOUT).await?;
        debug!(%channel, %addr, "channel endpoint is accepting connections");
        Ok(Arc::new(JsonLineBackend {
            channel: channel.to_owned(),
            addr,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }))
    }
}

async fn connect(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, DomainError> {
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(DomainError::ProviderUnavailable(format!(
            "cannot connect to {addr}: {e}"
        ))),
        Err(_) => Err(DomainError::ProviderUnavailable(format!(
            "connecting to {addr} timed out"
        ))),
    }
}

/// Backend reached over a fresh TCP connection per call.
#[derive(Debug, Clone)]
pub struct JsonLineBackend {
    channel: String,
    addr: SocketAddr,
    connect_timeout: Duration,
}

#[async_trait]
impl GameBackend for JsonLineBackend {
    async fn create_game(&self, message: &CreateGameMessage) -> Result<String, DomainError> {
        let stream = connect(self.addr, self.connect_timeout).await?;
        let (read_half, mut write_half) = stream.into_split();

        let request = IpcRequest {
            channel: self.channel.clone(),
            message: message.clone(),
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| DomainError::Infrastructure(format!("request encoding failed: {e}")))?;
        line.push('\n');
        write_half
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::ProviderUnavailable(format!("send failed: {e}")))?;
        write_half
            .flush()
            .await
            .map_err(|e| DomainError::ProviderUnavailable(format!("send failed: {e}")))?;

        let mut reply = String::new();
        let read = BufReader::new(read_half)
            .read_line(&mut reply)
            .await
            .map_err(|e| DomainError::ProviderUnavailable(format!("receive failed: {e}")))?;
        if read == 0 {
            return Err(DomainError::ProviderUnavailable(
                "backend closed the connection without replying".to_owned(),
            ));
        }

        match serde_json::from_str::<IpcReply>(reply.trim_end())
            .map_err(|e| DomainError::Infrastructure(format!("malformed reply: {e}")))?
        {
            IpcReply::Created { game_id } => Ok(game_id),
            IpcReply::Failed { error } => Err(DomainError::Infrastructure(format!(
                "backend refused: {error}"
            ))),
        }
    }
}
