//! Routes for viewing and editing the roster.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};
use wheeltools_core::error::DomainError;
use wheeltools_roster::application::query_handlers::{self, MemberView, RosterView};
use wheeltools_roster::application::reconciler::ReconcileOutcome;
use wheeltools_roster::application::roster_store::{
    DefaultsUpdate, MemberUpdate, TimedSpinsUpdate,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /apply-defaults.
#[derive(Debug, Serialize)]
pub struct ApplyDefaultsResponse {
    /// Members the defaults were copied onto.
    pub updated: usize,
}

fn roster(state: &AppState) -> RosterView {
    query_handlers::get_roster(&state.store, state.clock.as_ref())
}

/// GET /
async fn get_roster(State(state): State<AppState>) -> Json<RosterView> {
    Json(roster(&state))
}

/// GET /members/{name}
#[instrument(skip(state))]
async fn get_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MemberView>, ApiError> {
    let view = query_handlers::get_member(&state.store, &name, state.clock.as_ref())
        .ok_or(DomainError::MemberNotFound(name))?;
    Ok(Json(view))
}

/// PATCH /members/{name}
#[instrument(skip(state, update))]
async fn update_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(update): Json<MemberUpdate>,
) -> Result<Json<MemberView>, ApiError> {
    let edited = state
        .store
        .update_member(&name, update)?
        .ok_or_else(|| DomainError::MemberNotFound(name.clone()))?;
    info!(member = %edited.name(), "member edited");

    let view = query_handlers::get_member(&state.store, edited.name(), state.clock.as_ref())
        .ok_or(DomainError::MemberNotFound(name))?;
    Ok(Json(view))
}

/// PUT /defaults
#[instrument(skip(state, update))]
async fn update_defaults(
    State(state): State<AppState>,
    Json(update): Json<DefaultsUpdate>,
) -> Result<Json<RosterView>, ApiError> {
    state.store.update_defaults(update)?;
    Ok(Json(roster(&state)))
}

/// POST /apply-defaults
#[instrument(skip(state))]
async fn apply_defaults(
    State(state): State<AppState>,
) -> Result<Json<ApplyDefaultsResponse>, ApiError> {
    let updated = state.store.apply_defaults_to_all()?;
    Ok(Json(ApplyDefaultsResponse { updated }))
}

/// PUT /timed-spins
#[instrument(skip(state, update))]
async fn update_timed_spins(
    State(state): State<AppState>,
    Json(update): Json<TimedSpinsUpdate>,
) -> Result<Json<RosterView>, ApiError> {
    let settings = state.store.update_timed_spins(update)?;
    info!(
        enabled = settings.enabled(),
        interval_minutes = settings.interval_minutes(),
        "timed spin settings changed"
    );
    Ok(Json(roster(&state)))
}

/// POST /refresh
#[instrument(skip(state))]
async fn refresh(State(state): State<AppState>) -> Json<ReconcileOutcome> {
    Json(state.reconciler.refresh().await)
}

/// Returns the router for the roster.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roster))
        .route("/members/{name}", get(get_member).patch(update_member))
        .route("/defaults", put(update_defaults))
        .route("/apply-defaults", post(apply_defaults))
        .route("/timed-spins", put(update_timed_spins))
        .route("/refresh", post(refresh))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;
    use wheeltools_core::clock::Clock;
    use wheeltools_ipc::client::IpcClient;
    use wheeltools_orchestration::domain::delivery::DeliverySettings;
    use wheeltools_roster::application::roster_store::RosterStore;
    use wheeltools_test_support::{
        FixedClock, InMemoryConfigRepository, UnavailableChannelResolver,
    };

    fn app_state_with(store: Arc<RosterStore>, clock: Arc<dyn Clock>) -> AppState {
        let ipc = Arc::new(IpcClient::new(Arc::new(UnavailableChannelResolver)));
        AppState::new(clock, store, ipc, DeliverySettings::default())
    }

    fn test_app_state() -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let store = Arc::new(
            RosterStore::open(Arc::new(InMemoryConfigRepository::default()), clock.clone())
                .unwrap(),
        );
        store.upsert_from_membership("Alys Tern").unwrap();
        app_state_with(store, clock)
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(serde_json::to_vec(&b).unwrap())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_get_roster_returns_members_and_settings() {
        // Arrange
        let app = router().with_state(test_app_state());

        // Act
        let (status, json) = send(app, "GET", "/", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["members"][0]["name"], "Alys Tern");
        assert_eq!(json["members"][0]["game_id"], "<not created>");
        assert_eq!(json["defaults"]["spin_speed"], "8");
        assert_eq!(json["timed_spins"]["max_spins_per_member"], 10);
    }

    #[tokio::test]
    async fn test_patch_member_edits_fields() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(
            app,
            "PATCH",
            "/members/alys%20tern",
            Some(serde_json::json!({ "spin_count": "4", "enabled": false })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["spin_count"], "4");
        assert_eq!(json["enabled"], false);
    }

    #[tokio::test]
    async fn test_patch_unknown_member_returns_404() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(
            app,
            "PATCH",
            "/members/Nobody",
            Some(serde_json::json!({ "enabled": false })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "member_not_found");
    }

    #[tokio::test]
    async fn test_refresh_without_host_feed_reports_unavailable() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(app, "POST", "/refresh", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_timed_spins_cap_is_clamped() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(
            app,
            "PUT",
            "/timed-spins",
            Some(serde_json::json!({ "enabled": true, "max_spins_per_member": 50 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["timed_spins"]["enabled"], true);
        assert_eq!(json["timed_spins"]["max_spins_per_member"], 10);
    }

    #[tokio::test]
    async fn test_defaults_then_apply_updates_members() {
        let state = test_app_state();

        let (status, json) = send(
            router().with_state(state.clone()),
            "PUT",
            "/defaults",
            Some(serde_json::json!({ "preset": "classic", "spin_amount": "3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["defaults"]["preset"], "classic");

        let (status, json) = send(
            router().with_state(state.clone()),
            "POST",
            "/apply-defaults",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["updated"], 1);

        let member = state.store.member("Alys Tern").unwrap();
        assert_eq!(member.preset_id, "classic");
        assert_eq!(member.spin_count.raw(), "3");
    }
}
