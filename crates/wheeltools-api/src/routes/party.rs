//! Routes through which the host reports party membership.

use axum::extract::State;
use axum::{Json, Router, routing::post, routing::put};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use wheeltools_core::providers::{MembershipSnapshot, PartyEntry};
use wheeltools_roster::application::reconciler::ReconcileOutcome;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for PUT /snapshot: either the full party or the reason it
/// cannot be read.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PartySnapshotRequest {
    /// Current members in party order.
    Members {
        /// Party entries.
        members: Vec<PartyEntry>,
    },
    /// The host has no party to report.
    Unavailable {
        /// Why.
        unavailable: String,
    },
}

impl From<PartySnapshotRequest> for MembershipSnapshot {
    fn from(request: PartySnapshotRequest) -> Self {
        match request {
            PartySnapshotRequest::Members { members } => Self::Members(members),
            PartySnapshotRequest::Unavailable { unavailable } => Self::Unavailable {
                reason: unavailable,
            },
        }
    }
}

/// Request body for POST /joined.
#[derive(Debug, Deserialize)]
pub struct JoinedRequest {
    /// Character name.
    pub name: String,
    /// Home world, if known.
    #[serde(default)]
    pub world: Option<String>,
}

/// Request body for POST /left.
#[derive(Debug, Deserialize)]
pub struct LeftRequest {
    /// Character name.
    pub name: String,
}

/// Response body for POST /joined.
#[derive(Debug, Serialize)]
pub struct JoinedResponse {
    /// `true` when the member was not tracked before.
    pub added: bool,
}

/// Response body for POST /left.
#[derive(Debug, Serialize)]
pub struct LeftResponse {
    /// `true` when a tracked, enabled member was disabled.
    pub disabled: bool,
}

/// PUT /snapshot
#[instrument(skip(state, request))]
async fn put_snapshot(
    State(state): State<AppState>,
    Json(request): Json<PartySnapshotRequest>,
) -> Json<ReconcileOutcome> {
    state.membership.replace(request.into());
    Json(state.reconciler.refresh().await)
}

/// POST /joined
#[instrument(skip(state, request), fields(member = %request.name))]
async fn member_joined(
    State(state): State<AppState>,
    Json(request): Json<JoinedRequest>,
) -> Result<Json<JoinedResponse>, ApiError> {
    let added = state.reconciler.on_member_joined(&request.name)?;
    state.membership.insert(PartyEntry {
        name: request.name,
        world: request.world,
    });
    Ok(Json(JoinedResponse { added }))
}

/// POST /left
#[instrument(skip(state, request), fields(member = %request.name))]
async fn member_left(
    State(state): State<AppState>,
    Json(request): Json<LeftRequest>,
) -> Result<Json<LeftResponse>, ApiError> {
    state.membership.remove(&request.name);
    let disabled = state.reconciler.on_member_left(&request.name)?;
    Ok(Json(LeftResponse { disabled }))
}

/// Returns the party router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/snapshot", put(put_snapshot))
        .route("/joined", post(member_joined))
        .route("/left", post(member_left))
}
