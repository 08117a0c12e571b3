mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{Factory, TestApp, BROKEN_NAME};
use pokedex_api::error::AppError;
use pokedex_api::services::{CatalogCache, CatalogClient};

#[tokio::test]
async fn test_search_requires_auth() {
    let app = TestApp::new().await;

    app.server
        .get("/api/v1/pokemon/search")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search_by_name() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/search")
        .add_query_param("name", "Pikachu")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["results"][0]["id"], 25);
    assert_eq!(body["results"][0]["name"], "pikachu");
    assert_eq!(body["results"][0]["types"], json!(["electric"]));
}

#[tokio::test]
async fn test_search_listing_page() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/search")
        .add_query_param("limit", 2)
        .add_query_param("offset", 1)
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "count": 5,
        "limit": 2,
        "offset": 1,
        "results": [
            { "id": 4, "name": "charmander" },
            { "id": 6, "name": "charizard" }
        ]
    }));
}

#[tokio::test]
async fn test_search_rejects_bad_limit() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    for limit in [0, 201] {
        app.server
            .get("/api/v1/pokemon/search")
            .add_query_param("limit", limit)
            .add_header("Authorization", auth.auth_header())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_get_pokemon_detail() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/25")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "pikachu");
    assert_eq!(
        body["sprite"],
        format!("{}/sprites/25.png", app.catalog.base_url)
    );
    assert_eq!(body["stats"][0], json!({ "name": "hp", "base": 45 }));
    assert_eq!(
        body["description"],
        "Cuando se juntan varios de estos POKéMON, su electricidad puede causar tormentas."
    );
}

#[tokio::test]
async fn test_description_falls_back_to_english_then_empty() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let bulbasaur = app
        .server
        .get("/api/v1/pokemon/bulbasaur")
        .add_header("Authorization", auth.auth_header())
        .await;
    bulbasaur.assert_status_ok();
    let body: serde_json::Value = bulbasaur.json();
    assert_eq!(
        body["description"],
        "A strange seed was planted on its back at birth."
    );

    let squirtle = app
        .server
        .get("/api/v1/pokemon/7")
        .add_header("Authorization", auth.auth_header())
        .await;
    squirtle.assert_status_ok();
    let body: serde_json::Value = squirtle.json();
    assert_eq!(body["description"], "");
}

#[tokio::test]
async fn test_get_unknown_pokemon() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/agumon")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get(&format!("/api/v1/pokemon/{}", BROKEN_NAME))
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Error calling PokeAPI");
}

#[tokio::test]
async fn test_unreachable_catalog() {
    let cache = Arc::new(CatalogCache::new(8));
    // Nothing listens on port 1
    let client = CatalogClient::new("http://127.0.0.1:1", Duration::from_secs(2), "en", cache)
        .unwrap();

    let err = client.get("pikachu").await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamUnavailable(_)));

    let err = client.get_on_blocking_pool("pikachu").await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_lookups_are_cached() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let by_name = catalog.get("Pikachu").await.unwrap();
    assert_eq!(app.catalog.pokemon_hits(), 1);

    // Remembered under the id as well
    let by_id = catalog.get("25").await.unwrap();
    assert_eq!(by_id, by_name);
    assert_eq!(app.catalog.pokemon_hits(), 1);

    // The blocking path shares the same cache
    catalog.get_on_blocking_pool("25").await.unwrap();
    assert_eq!(app.catalog.pokemon_hits(), 1);

    assert!(catalog.cache().invalidate("25"));
    catalog.get("25").await.unwrap();
    assert_eq!(app.catalog.pokemon_hits(), 2);
}

#[tokio::test]
async fn test_get_pokemon_by_type() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/type/fire")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();
    response.assert_json(&json!([
        { "id": 4, "name": "charmander" },
        { "id": 6, "name": "charizard" }
    ]));

    app.server
        .get("/api/v1/pokemon/type/shadow")
        .add_header("Authorization", auth.auth_header())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_pokemon_card_generates_pdf() {
    let app = TestApp::new().await;
    let auth = Factory::new(&app.state).create_user().await;

    let response = app
        .server
        .get("/api/v1/pokemon/pikachu/card")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"pokemon_pikachu.pdf\""
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));
}
