mod handlers;
pub mod middleware;
pub mod schema;

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::favorites::Favorites;
use crate::mcp::{http_service, FoodOrderingServer};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub favorites: Option<Favorites>,
    pub mcp: FoodOrderingServer,
    /// Base URL advertised in the OpenAPI document.
    pub api_url: String,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Chat sessions
        .route("/chat/sessions", post(handlers::create_session))
        .route("/chat/sessions/{id}", get(handlers::get_session))
        .route("/chat/sessions/{id}", delete(handlers::delete_session))
        .route("/chat/sessions/{id}/turns", post(handlers::post_turn))
        .route("/chat/sessions/{id}/order", get(handlers::get_tracked_order))
        // Favorites
        .route("/favorites", get(handlers::list_favorites))
        // Health
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive());

    // Both the standalone and the serverless-style paths serve MCP.
    let mcp = Router::new()
        .route_service("/mcp", http_service(state.mcp.clone()))
        .route_service("/api/mcp", http_service(state.mcp.clone()))
        .layer(from_fn(middleware::mcp_cors));

    let discovery = Router::new()
        .route("/api/schema", get(handlers::openapi_schema))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api/v1", api)
        .merge(discovery)
        .merge(mcp)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
