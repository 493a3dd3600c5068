mod common;

use common::{dead_base_url, spawn_fake, Reply};
use serde_json::json;
use std::time::Duration;
use uno_table::{ApiClient, ApiError, CardColor, PlayRequest};

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[actix_web::test]
async fn test_health_and_content_type() {
    let fake = spawn_fake(|_| Reply::json(200, json!({"status": "ok"}))).await;

    let body = client(&fake.base_url).health().await.unwrap();

    assert_eq!(body, Some(json!({"status": "ok"})));
    let seen = fake.last("GET", "/").unwrap();
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
}

#[actix_web::test]
async fn test_create_sends_empty_object_by_default() {
    let fake = spawn_fake(|_| Reply::json(201, json!({"gameId": "g1"}))).await;
    let api = client(&fake.base_url);

    let body = api.create_game(None).await.unwrap();
    assert_eq!(body, Some(json!({"gameId": "g1"})));
    assert_eq!(fake.last("POST", "/games").unwrap().body, Some(json!({})));

    api.create_game(Some(json!({"mode": "singleplayer"})))
        .await
        .unwrap();
    assert_eq!(
        fake.last("POST", "/games").unwrap().body,
        Some(json!({"mode": "singleplayer"}))
    );
}

#[actix_web::test]
async fn test_error_status_carries_server_detail() {
    let fake = spawn_fake(|_| Reply::json(409, json!({"detail": "Not your turn"}))).await;

    let err = client(&fake.base_url)
        .draw_card("g1", None)
        .await
        .unwrap_err();

    match err {
        ApiError::Http {
            status,
            ref message,
            ref body,
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Not your turn");
            assert_eq!(body, &Some(json!({"detail": "Not your turn"})));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[actix_web::test]
async fn test_error_status_without_message_uses_default() {
    let fake = spawn_fake(|_| Reply::raw(500, "<h1>boom</h1>")).await;

    let err = client(&fake.base_url)
        .get_game_state("g1")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Request failed (500 Internal Server Error)");
}

#[actix_web::test]
async fn test_unparseable_success_body_is_none() {
    let fake = spawn_fake(|_| Reply::raw(200, "definitely not json")).await;

    let body = client(&fake.base_url).call_uno("g1", None).await.unwrap();

    assert_eq!(body, None);
    assert_eq!(fake.count("POST", "/games/g1/uno"), 1);
}

#[actix_web::test]
async fn test_slow_service_times_out() {
    let fake =
        spawn_fake(|_| Reply::json(200, json!({})).after(Duration::from_millis(1_500))).await;
    let api = ApiClient::new(&fake.base_url, Duration::from_millis(150)).unwrap();

    let err = api.get_game_state("g1").await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(150)));
}

#[actix_web::test]
async fn test_unreachable_service_is_network_error() {
    let err = client(&dead_base_url()).health().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
}

#[actix_web::test]
async fn test_game_id_is_one_encoded_segment() {
    let fake = spawn_fake(|_| Reply::json(200, json!({}))).await;

    client(&fake.base_url)
        .get_game_state("table 1/b")
        .await
        .unwrap();

    assert_eq!(fake.requests()[0].path, "/games/table%201%2Fb");
}

#[actix_web::test]
async fn test_action_methods_and_bodies() {
    let fake = spawn_fake(|_| Reply::json(200, json!({"ok": true}))).await;
    let api = client(&fake.base_url);

    api.restart_game("g1").await.unwrap();
    let restart = fake.last("POST", "/games/g1/restart").unwrap();
    assert_eq!(restart.body, None);

    api.update_settings("g1", Some(json!({"sound": false})))
        .await
        .unwrap();
    let patch = fake.last("PATCH", "/games/g1/settings").unwrap();
    assert_eq!(patch.body, Some(json!({"sound": false})));

    api.join_game("g1", Some(json!({"name": "Ann"})))
        .await
        .unwrap();
    assert_eq!(
        fake.last("POST", "/games/g1/join").unwrap().body,
        Some(json!({"name": "Ann"}))
    );

    api.play_card(
        "g1",
        &PlayRequest {
            card_id: "wild:WILD".into(),
            chosen_color: Some(CardColor::Blue),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        fake.last("POST", "/games/g1/play").unwrap().body,
        Some(json!({"cardId": "wild:WILD", "chosenColor": "blue"}))
    );
}

#[actix_web::test]
async fn test_base_path_is_kept() {
    let fake = spawn_fake(|_| Reply::json(200, json!({}))).await;
    let api = client(&format!("{}/api/v1/", fake.base_url));

    api.draw_card("g1", None).await.unwrap();

    assert_eq!(fake.requests()[0].path, "/api/v1/games/g1/draw");
}
