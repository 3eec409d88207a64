//! Integration tests for game creation and link delivery.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use wheeltools_test_support::ScriptedGameBackend;

async fn wait_until_delivered(app: &common::TestApp) {
    for _ in 0..100 {
        if !app.state.link_delivery.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("link delivery did not finish");
}

#[tokio::test]
async fn test_create_games_reports_partial_failure() {
    // Arrange
    let app = common::build_test_app_with_backend(ScriptedGameBackend::failing_for(&["Brom Hale"]));
    common::report_party(
        &app,
        serde_json::json!([{ "name": "Alys Tern" }, { "name": "Brom Hale" }, { "name": "Cora Vell" }]),
    )
    .await;

    // Act
    let (status, json) =
        common::post_json(app.router(), "/api/v1/games/create", &serde_json::json!({})).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["succeeded"], serde_json::json!(["Alys Tern", "Cora Vell"]));
    assert_eq!(json["failed"][0]["member"], "Brom Hale");
    assert!(json["batch_id"].is_string());

    let (_, roster) = common::get_json(app.router(), "/api/v1/roster").await;
    assert_eq!(roster["members"][0]["game_id"], "game-Alys Tern");
    assert_eq!(roster["members"][1]["game_id"], "<not created>");
    assert_eq!(roster["members"][2]["game_id"], "game-Cora Vell");
}

#[tokio::test]
async fn test_send_links_queues_tells_for_the_host() {
    // Arrange
    let app = common::build_test_app();
    common::report_party(
        &app,
        serde_json::json!([{ "name": "Alys Tern", "world": "Lich" }, { "name": "Brom Hale" }]),
    )
    .await;
    common::post_json(app.router(), "/api/v1/games/create", &serde_json::json!({})).await;

    // Act
    let (status, json) =
        common::post_json(app.router(), "/api/v1/games/send-links", &serde_json::json!({})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["running"], true);
    wait_until_delivered(&app).await;

    // Assert
    let (status, json) =
        common::post_json(app.router(), "/api/v1/outbox/drain", &serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["commands"],
        serde_json::json!([
            "/tell Alys Tern@Lich https://wheel.gamba.pro/wheel/game-Alys Tern",
            "/tell Brom Hale https://wheel.gamba.pro/wheel/game-Brom Hale"
        ])
    );

    let (_, json) = common::get_json(app.router(), "/api/v1/games/send-links").await;
    assert_eq!(json["running"], false);
}

#[tokio::test]
async fn test_send_to_one_member() {
    let app = common::build_test_app();
    common::report_party(&app, serde_json::json!([{ "name": "Alys Tern" }])).await;

    // No game yet.
    let (status, json) = common::send_empty(app.router(), "POST", "/api/v1/games/send/Alys%20Tern").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    common::post_json(app.router(), "/api/v1/games/create", &serde_json::json!({})).await;
    let (status, _) = common::send_empty(app.router(), "POST", "/api/v1/games/send/Alys%20Tern").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.state.outbox.len(), 1);

    let (status, json) = common::send_empty(app.router(), "POST", "/api/v1/games/send/Nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "member_not_found");
}

#[tokio::test]
async fn test_abort_without_running_delivery_returns_404() {
    let app = common::build_test_app();

    let (status, _) = common::send_empty(app.router(), "DELETE", "/api/v1/games/send-links").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_spin_text_is_reported_per_member() {
    let app = common::build_test_app();
    common::report_party(&app, serde_json::json!([{ "name": "Alys Tern" }, { "name": "Brom Hale" }])).await;
    common::send_json(
        app.router(),
        "PATCH",
        "/api/v1/roster/members/Alys%20Tern",
        &serde_json::json!({ "spin_speed": "fast" }),
    )
    .await;

    let (_, json) =
        common::post_json(app.router(), "/api/v1/games/create", &serde_json::json!({})).await;

    assert_eq!(json["succeeded"], serde_json::json!(["Brom Hale"]));
    assert_eq!(json["failed"][0]["member"], "Alys Tern");
    assert_eq!(app.backend.requests().len(), 1);
}
