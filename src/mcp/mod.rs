//! MCP server exposing the ordering API and the chat flow as tools.

mod types;

use std::sync::Arc;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    },
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::json;
use uuid::Uuid;

use crate::client::{ClientError, OrderingApi};
use crate::models::CreateOrderInput;
use crate::render::Platform;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct FoodOrderingServer {
    client: Arc<dyn OrderingApi>,
    sessions: Arc<SessionStore>,
    tool_router: ToolRouter<Self>,
}

impl FoodOrderingServer {
    pub fn new(client: Arc<dyn OrderingApi>, sessions: Arc<SessionStore>) -> Self {
        Self {
            client,
            sessions,
            tool_router: Self::tool_router(),
        }
    }
}

fn client_err(e: ClientError) -> McpError {
    match e {
        ClientError::NotFound(msg) => McpError::invalid_params(format!("Not found: {}", msg), None),
        ClientError::BadRequest(msg) => McpError::invalid_params(msg, None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn with_structured(text: String, structured: serde_json::Value) -> CallToolResult {
    let mut result = CallToolResult::success(vec![Content::text(text)]);
    result.structured_content = Some(structured);
    result
}

#[tool_router]
impl FoodOrderingServer {
    #[tool(description = "Get list of available cities for food delivery")]
    pub async fn get_cities(&self) -> Result<CallToolResult, McpError> {
        let cities = self.client.cities().await.map_err(client_err)?;
        Ok(with_structured(
            format!("Available cities: {}", cities.join(", ")),
            json!({ "cities": cities, "action": "show_cities" }),
        ))
    }

    #[tool(description = "Get list of available cuisine types")]
    pub async fn get_cuisines(&self) -> Result<CallToolResult, McpError> {
        let cuisines = self.client.cuisines().await.map_err(client_err)?;
        Ok(with_structured(
            format!("Available cuisines: {}", cuisines.join(", ")),
            json!({ "cuisines": cuisines, "action": "show_cuisines" }),
        ))
    }

    #[tool(description = "Search for restaurants by city and/or cuisine")]
    pub async fn search_restaurants(
        &self,
        params: Parameters<SearchRestaurantsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let restaurants = self
            .client
            .search_restaurants(req.city.as_deref(), req.cuisine.as_deref())
            .await
            .map_err(client_err)?;

        Ok(with_structured(
            format!("Found {} restaurants", restaurants.len()),
            json!({
                "restaurants": restaurants,
                "action": "show_restaurants",
                "filters": { "city": req.city, "cuisine": req.cuisine },
            }),
        ))
    }

    #[tool(description = "Get the menu for a specific restaurant")]
    pub async fn get_menu(
        &self,
        params: Parameters<GetMenuRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let menu = self
            .client
            .menu(&req.restaurant_id)
            .await
            .map_err(client_err)?;

        Ok(with_structured(
            format!("Menu loaded for restaurant {}", req.restaurant_id),
            json!({
                "menu": menu.categories,
                "restaurant_id": req.restaurant_id,
                "action": "show_menu",
            }),
        ))
    }

    #[tool(description = "Create a new food order")]
    pub async fn create_order(
        &self,
        params: Parameters<CreateOrderRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        if req.items.is_empty() {
            return Err(McpError::invalid_params("Order must contain at least one item", None));
        }
        if let Some(item) = req.items.iter().find(|i| i.quantity == 0) {
            return Err(McpError::invalid_params(
                format!("Quantity for '{}' must be at least 1", item.name),
                None,
            ));
        }

        let input = CreateOrderInput::from(req);
        let order = self.client.create_order(&input).await.map_err(client_err)?;
        tracing::info!(order_id = %order.id, "order created via MCP");

        Ok(with_structured(
            format!("Order created: {}", order.id),
            json!({ "order": order, "action": "show_confirmation" }),
        ))
    }

    #[tool(
        description = "Talk to the food ordering assistant. Send what the user said; the reply walks them through search, menu, cart, checkout and tracking. Pass back the returned session_id to continue the same conversation."
    )]
    pub async fn chat(&self, params: Parameters<ChatRequest>) -> Result<CallToolResult, McpError> {
        let req = params.0;

        let existing = match req.session_id.as_deref() {
            Some(raw) => {
                let id = Uuid::parse_str(raw).map_err(|e| {
                    McpError::invalid_params(format!("Invalid session_id: {}", e), None)
                })?;
                if !self.sessions.contains(id) {
                    return Err(McpError::invalid_params("Session not found", None));
                }
                Some(id)
            }
            None => None,
        };

        let (session_id, reply, stage, cart, totals) = match existing {
            Some(id) => {
                let outcome = self
                    .sessions
                    .turn(id, &req.message)
                    .await
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                (id, outcome.reply, outcome.stage, outcome.cart, outcome.totals)
            }
            None => {
                let created = self.sessions.create(Some(Platform::Gpt));
                let id = created.session_id;
                if req.message.trim().is_empty() {
                    let snapshot = self
                        .sessions
                        .get(id)
                        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                    (id, created.reply, snapshot.stage, snapshot.cart, snapshot.totals)
                } else {
                    let outcome = self
                        .sessions
                        .turn(id, &req.message)
                        .await
                        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                    (id, outcome.reply, outcome.stage, outcome.cart, outcome.totals)
                }
            }
        };

        Ok(with_structured(
            reply.text.clone(),
            json!({
                "session_id": session_id,
                "stage": stage,
                "reply": reply,
                "cart": cart,
                "totals": totals,
                "action": "chat_reply",
            }),
        ))
    }
}

#[tool_handler]
impl ServerHandler for FoodOrderingServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "food-ordering-app".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Food Ordering".into()),
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Food ordering assistant backed by a remote restaurant API.

DIRECT TOOLS:
- get_cities / get_cuisines: what can be searched
- search_restaurants: filter by city and/or cuisine
- get_menu: categorized menu of one restaurant
- create_order: place an order with explicit items and delivery address

CONVERSATIONAL TOOL:
- chat: send the user's words verbatim. The first call starts a session; pass
  the returned session_id on every following call. Numbers select from the
  options listed in the previous reply. Say "start over" to reset."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

/// Streamable HTTP transport for mounting under an axum router.
pub fn http_service(
    server: FoodOrderingServer,
) -> StreamableHttpService<FoodOrderingServer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    )
}

pub async fn run_stdio_server(server: FoodOrderingServer) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let server = server.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
