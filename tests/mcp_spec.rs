//! MCP server integration tests.
//!
//! Tools are called directly on the server, backed by a scripted ordering
//! API:
//! - Direct tools: thin wrappers over the remote API
//! - Chat tool: the conversational flow with server-side sessions

mod support;

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::Value;

use food_concierge::config::EngineSettings;
use food_concierge::engine::ChatEngine;
use food_concierge::mcp::*;
use food_concierge::render::Platform;
use food_concierge::session::SessionStore;
use support::ScriptedApi;

/// Helper to create a test MCP server over a scripted API.
fn setup() -> (FoodOrderingServer, Arc<ScriptedApi>, Arc<SessionStore>) {
    let api = Arc::new(ScriptedApi::new());
    let engine = Arc::new(ChatEngine::new(api.clone(), EngineSettings::default()));
    let sessions = Arc::new(SessionStore::new(
        engine,
        api.clone(),
        Duration::from_secs(60),
        Platform::Web,
    ));
    let server = FoodOrderingServer::new(api.clone(), sessions.clone());
    (server, api, sessions)
}

fn text(result: &CallToolResult) -> String {
    let value = serde_json::to_value(result).expect("Failed to serialize result");
    value["content"][0]["text"]
        .as_str()
        .expect("Expected text content")
        .to_string()
}

fn structured(result: &CallToolResult) -> Value {
    result
        .structured_content
        .clone()
        .expect("Expected structured content")
}

fn order_request(items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        restaurant_id: "rest_1".to_string(),
        items,
        delivery_address: DeliveryAddressInput {
            address: "1 Wacker Dr".to_string(),
            city: "Chicago".to_string(),
            state: "IL".to_string(),
            zip: "60601".to_string(),
        },
    }
}

fn margherita(quantity: u32) -> OrderItemInput {
    OrderItemInput {
        item_id: "m1".to_string(),
        name: "Margherita Pizza".to_string(),
        price: 12.0,
        quantity,
    }
}

// ============================================================
// Direct Tools
// ============================================================

mod direct_tools {
    use super::*;

    #[tokio::test]
    async fn get_cities_lists_them_in_text_and_structure() {
        let (server, _, _) = setup();

        let result = server.get_cities().await.expect("Tool failed");

        assert_eq!(text(&result), "Available cities: New York, Chicago");
        let data = structured(&result);
        assert_eq!(data["action"], "show_cities");
        assert_eq!(data["cities"][1], "Chicago");
    }

    #[tokio::test]
    async fn get_cuisines_lists_them() {
        let (server, _, _) = setup();

        let result = server.get_cuisines().await.expect("Tool failed");

        assert_eq!(text(&result), "Available cuisines: Italian, Japanese");
        assert_eq!(structured(&result)["action"], "show_cuisines");
    }

    #[tokio::test]
    async fn search_restaurants_echoes_filters() {
        let (server, api, _) = setup();

        let result = server
            .search_restaurants(Parameters(SearchRestaurantsRequest {
                city: Some("Chicago".to_string()),
                cuisine: None,
            }))
            .await
            .expect("Tool failed");

        assert_eq!(text(&result), "Found 2 restaurants");
        let data = structured(&result);
        assert_eq!(data["action"], "show_restaurants");
        assert_eq!(data["filters"]["city"], "Chicago");
        assert!(data["filters"]["cuisine"].is_null());
        assert_eq!(data["restaurants"].as_array().map(Vec::len), Some(2));
        assert_eq!(api.calls(), vec!["search_restaurants:Chicago|"]);
    }

    #[tokio::test]
    async fn get_menu_returns_categories() {
        let (server, _, _) = setup();

        let result = server
            .get_menu(Parameters(GetMenuRequest {
                restaurant_id: "rest_1".to_string(),
            }))
            .await
            .expect("Tool failed");

        assert_eq!(text(&result), "Menu loaded for restaurant rest_1");
        let data = structured(&result);
        assert_eq!(data["restaurant_id"], "rest_1");
        assert_eq!(data["menu"][0]["name"], "Pizzas");
        assert_eq!(data["menu"][1]["items"][0]["name"], "Caesar Salad");
    }

    #[tokio::test]
    async fn get_menu_for_unknown_restaurant_fails() {
        let (server, _, _) = setup();

        let result = server
            .get_menu(Parameters(GetMenuRequest {
                restaurant_id: "nope".to_string(),
            }))
            .await;

        let err = result.expect_err("Expected an error");
        assert!(err.message.contains("Not found"));
    }

    #[tokio::test]
    async fn create_order_forwards_items_and_address() {
        let (server, api, _) = setup();

        let result = server
            .create_order(Parameters(order_request(vec![margherita(2)])))
            .await
            .expect("Tool failed");

        assert_eq!(text(&result), "Order created: ORD-1");
        let data = structured(&result);
        assert_eq!(data["action"], "show_confirmation");
        assert_eq!(data["order"]["status"], "confirmed");

        let orders = api.created_orders();
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].delivery_address.address, "1 Wacker Dr");
    }

    #[tokio::test]
    async fn create_order_rejects_empty_orders_and_zero_quantities() {
        let (server, api, _) = setup();

        let empty = server
            .create_order(Parameters(order_request(Vec::new())))
            .await
            .expect_err("Expected an error");
        assert!(empty.message.contains("at least one item"));

        let zero = server
            .create_order(Parameters(order_request(vec![margherita(0)])))
            .await
            .expect_err("Expected an error");
        assert!(zero.message.contains("Margherita Pizza"));

        assert_eq!(api.count_calls("create_order"), 0);
    }

    #[tokio::test]
    async fn remote_failures_surface_as_errors() {
        let (server, api, _) = setup();
        api.fail("cities");

        let err = server.get_cities().await.expect_err("Expected an error");

        assert!(err.message.contains("cities unavailable"));
    }
}

// ============================================================
// Chat Tool
// ============================================================

mod chat_tool {
    use super::*;

    fn chat(session_id: Option<&str>, message: &str) -> Parameters<ChatRequest> {
        Parameters(ChatRequest {
            session_id: session_id.map(str::to_string),
            message: message.to_string(),
        })
    }

    fn session_id(result: &CallToolResult) -> String {
        structured(result)["session_id"]
            .as_str()
            .expect("Expected session_id")
            .to_string()
    }

    #[tokio::test]
    async fn first_call_opens_a_text_session() {
        let (server, _, sessions) = setup();

        let result = server.chat(chat(None, "pizza")).await.expect("Tool failed");

        let reply = text(&result);
        assert!(reply.contains("I found 3 restaurants"));
        assert!(reply.ends_with("Type the number to select."));
        assert!(!reply.contains("**"));

        let data = structured(&result);
        assert_eq!(data["action"], "chat_reply");
        assert_eq!(data["stage"], "search");
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn empty_first_message_returns_the_welcome() {
        let (server, api, _) = setup();

        let result = server.chat(chat(None, "  ")).await.expect("Tool failed");

        assert!(text(&result).contains("What are you craving today?"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn session_carries_the_cart_to_checkout() {
        let (server, _, _) = setup();

        let first = server.chat(chat(None, "pizza")).await.expect("Tool failed");
        let id = session_id(&first);

        for message in ["1", "2 of item 1"] {
            server
                .chat(chat(Some(&id), message))
                .await
                .expect("Tool failed");
        }
        let checkout = server
            .chat(chat(Some(&id), "checkout"))
            .await
            .expect("Tool failed");

        let data = structured(&checkout);
        assert_eq!(data["stage"], "checkout");
        assert_eq!(data["cart"][0]["quantity"], 2);
        assert!(text(&checkout).contains("Total: $29.10"));

        let placed = server
            .chat(chat(Some(&id), "1"))
            .await
            .expect("Tool failed");
        assert_eq!(structured(&placed)["stage"], "order_placed");
        assert!(text(&placed).contains("Order ID: ORD-1"));
    }

    #[tokio::test]
    async fn unknown_or_malformed_session_is_rejected() {
        let (server, _, _) = setup();

        let unknown = server
            .chat(chat(Some("7b0c1c9e-3f5c-4c2e-9d3c-1c2b3a4d5e6f"), "hi"))
            .await
            .expect_err("Expected an error");
        assert!(unknown.message.contains("Session not found"));

        let malformed = server
            .chat(chat(Some("abc"), "hi"))
            .await
            .expect_err("Expected an error");
        assert!(malformed.message.contains("Invalid session_id"));
    }
}
