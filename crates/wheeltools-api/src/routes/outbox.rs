//! Route through which the host collects queued chat commands.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

/// Response body for POST /drain.
#[derive(Debug, Serialize)]
pub struct DrainResponse {
    /// Commands to run, oldest first.
    pub commands: Vec<String>,
}

/// POST /drain
async fn drain(State(state): State<AppState>) -> Json<DrainResponse> {
    let commands = state.outbox.drain();
    if !commands.is_empty() {
        debug!(count = commands.len(), "outbox drained");
    }
    Json(DrainResponse { commands })
}

/// Returns the outbox router.
pub fn router() -> Router<AppState> {
    Router::new().route("/drain", post(drain))
}
