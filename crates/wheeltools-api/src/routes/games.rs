//! Routes for creating games and delivering their links.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use tracing::{info, instrument};
use wheeltools_orchestration::domain::report::BatchReport;

use crate::error::ApiError;
use crate::state::AppState;

/// State of the background link delivery.
#[derive(Debug, Serialize)]
pub struct LinkDeliveryResponse {
    /// Whether a delivery is in progress after the request.
    pub running: bool,
}

/// POST /create
#[instrument(skip(state))]
async fn create_games(State(state): State<AppState>) -> Json<BatchReport> {
    Json(state.orchestrator.create_games_for_enabled().await)
}

/// POST /send-links
#[instrument(skip(state))]
async fn start_send_links(
    State(state): State<AppState>,
) -> (StatusCode, Json<LinkDeliveryResponse>) {
    let status = if state.link_delivery.start(&state.orchestrator) {
        info!("link delivery started");
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(LinkDeliveryResponse { running: true }))
}

/// GET /send-links
async fn send_links_status(State(state): State<AppState>) -> Json<LinkDeliveryResponse> {
    Json(LinkDeliveryResponse {
        running: state.link_delivery.is_running(),
    })
}

/// DELETE /send-links
#[instrument(skip(state))]
async fn abort_send_links(State(state): State<AppState>) -> StatusCode {
    if state.link_delivery.abort() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// POST /send/{name}
#[instrument(skip(state))]
async fn send_to_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.send_link_to_member(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the games router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_games))
        .route(
            "/send-links",
            post(start_send_links)
                .get(send_links_status)
                .delete(abort_send_links),
        )
        .route("/send/{name}", post(send_to_member))
}
