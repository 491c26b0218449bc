mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use food_concierge::api::{create_router, AppState};
use food_concierge::config::EngineSettings;
use food_concierge::engine::ChatEngine;
use food_concierge::favorites::Favorites;
use food_concierge::mcp::FoodOrderingServer;
use food_concierge::render::Platform;
use food_concierge::session::SessionStore;
use support::ScriptedApi;

fn setup() -> TestServer {
    let api = Arc::new(ScriptedApi::new());
    let favorites = Favorites::in_memory();
    let engine = Arc::new(
        ChatEngine::new(api.clone(), EngineSettings::default()).with_favorites(favorites.clone()),
    );
    let sessions = Arc::new(SessionStore::new(
        engine,
        api.clone(),
        Duration::from_secs(60),
        Platform::Web,
    ));
    let mcp = FoodOrderingServer::new(api, sessions.clone());
    let app = create_router(AppState {
        sessions,
        favorites: Some(favorites),
        mcp,
        api_url: "https://food.example.com/api/v1".to_string(),
    });
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_session(server: &TestServer, platform: &str) -> String {
    let response = server
        .post("/api/v1/chat/sessions")
        .json(&json!({ "platform": platform }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["session_id"].as_str().expect("session_id").to_string()
}

async fn say(server: &TestServer, id: &str, input: &str) -> Value {
    let response = server
        .post(&format!("/api/v1/chat/sessions/{}/turns", id))
        .json(&json!({ "input": input }))
        .await;
    response.assert_status_ok();
    response.json()
}

mod discovery {
    use super::*;

    #[tokio::test]
    async fn root_names_the_server() {
        let server = setup();

        let response = server.get("/").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "Food Ordering MCP Server");
    }

    #[tokio::test]
    async fn health_reports_session_count() {
        let server = setup();
        create_session(&server, "web").await;

        let body: Value = server.get("/api/v1/health").await.json();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 1);
    }

    #[tokio::test]
    async fn schema_advertises_the_configured_api() {
        let server = setup();

        let response = server.get("/api/schema").await;

        response.assert_status_ok();
        let doc: Value = response.json();
        assert_eq!(doc["openapi"], "3.1.0");
        assert_eq!(doc["servers"][0]["url"], "https://food.example.com/api/v1");
        assert!(doc["paths"].get("/orders/create").is_some());
    }

    #[tokio::test]
    async fn unknown_path_is_a_json_404() {
        let server = setup();

        let response = server.get("/nowhere").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Not Found");
    }
}

mod mcp_endpoint {
    use super::*;

    #[tokio::test]
    async fn preflight_is_answered_on_both_paths() {
        let server = setup();

        for path in ["/mcp", "/api/mcp"] {
            let response = server.method(Method::OPTIONS, path).await;

            response.assert_status(StatusCode::NO_CONTENT);
            assert_eq!(response.header("access-control-allow-origin"), "*");
            assert_eq!(response.header("access-control-expose-headers"), "Mcp-Session-Id");
        }
    }
}

mod chat_sessions {
    use super::*;

    #[tokio::test]
    async fn create_without_body_uses_the_default_platform() {
        let server = setup();

        let response = server.post("/api/v1/chat/sessions").await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["capabilities"]["platform"], "web");
        assert_eq!(body["reply"]["stage"], "search");
        assert_eq!(body["reply"]["actions"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn create_rejects_unknown_platform() {
        let server = setup();

        let response = server
            .post("/api/v1/chat/sessions")
            .json(&json!({ "platform": "fax" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("fax"));
    }

    #[tokio::test]
    async fn turns_advance_the_conversation() {
        let server = setup();
        let id = create_session(&server, "web").await;

        let listed = say(&server, &id, "pizza").await;
        assert_eq!(listed["applied"], true);
        assert_eq!(listed["reply"]["actions"][0]["value"], "1");

        say(&server, &id, "1").await;
        let added = say(&server, &id, "2 of item 1").await;
        assert_eq!(added["stage"], "adding_items");
        assert_eq!(added["cart"][0]["item_id"], "m1");
        assert_eq!(added["totals"]["subtotal"], 24.0);

        let snapshot: Value = server
            .get(&format!("/api/v1/chat/sessions/{}", id))
            .await
            .json();
        assert_eq!(snapshot["stage"], "adding_items");
        assert_eq!(snapshot["restaurant"]["name"], "Pizza Palace");
        assert_eq!(snapshot["busy"], false);
    }

    #[tokio::test]
    async fn gpt_sessions_get_plain_text_options() {
        let server = setup();
        let id = create_session(&server, "gpt").await;

        let listed = say(&server, &id, "pizza").await;

        assert!(listed["reply"]["actions"].as_array().unwrap().is_empty());
        let text = listed["reply"]["text"].as_str().unwrap();
        assert!(text.contains("3. Taco Town"));
    }

    #[tokio::test]
    async fn order_tracking_endpoint_reports_the_placed_order() {
        let server = setup();
        let id = create_session(&server, "web").await;

        let before: Value = server
            .get(&format!("/api/v1/chat/sessions/{}/order", id))
            .await
            .json();
        assert!(before["order_id"].is_null());

        for input in ["pizza", "1", "2 of item 1", "checkout", "confirm"] {
            say(&server, &id, input).await;
        }

        let after: Value = server
            .get(&format!("/api/v1/chat/sessions/{}/order", id))
            .await
            .json();
        assert_eq!(after["order_id"], "ORD-1");
    }

    #[tokio::test]
    async fn delete_then_lookups_are_404() {
        let server = setup();
        let id = create_session(&server, "mobile").await;

        server
            .delete(&format!("/api/v1/chat/sessions/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/chat/sessions/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&format!("/api/v1/chat/sessions/{}/turns", id))
            .json(&json!({ "input": "hello" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/api/v1/chat/sessions/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod favorites {
    use super::*;

    #[tokio::test]
    async fn lists_what_the_chat_toggled() {
        let server = setup();
        let id = create_session(&server, "web").await;

        let empty: Value = server.get("/api/v1/favorites").await.json();
        assert_eq!(empty, json!({ "restaurants": [], "dishes": [] }));

        for input in ["pizza", "1", "favorite", "favorite caesar"] {
            say(&server, &id, input).await;
        }

        let body: Value = server.get("/api/v1/favorites").await.json();
        assert_eq!(body["restaurants"], json!(["rest_1"]));
        assert_eq!(body["dishes"], json!(["c1"]));
    }
}
