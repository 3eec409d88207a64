//! WheelTools — HTTP control surface.

pub mod adapters;
pub mod error;
pub mod routes;
pub mod settings;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full router over `state`.
pub fn build_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins once the host UI origin is fixed.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/roster", routes::roster::router())
        .nest("/api/v1/party", routes::party::router())
        .nest("/api/v1/games", routes::games::router())
        .nest("/api/v1/outbox", routes::outbox::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
