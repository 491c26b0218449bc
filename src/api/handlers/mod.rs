use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{schema, AppState};
use crate::models::Order;
use crate::render::Platform;
use crate::session::{CreatedSession, SessionError, SessionSnapshot, TurnOutcome};

// ============================================================
// Error Handling
// ============================================================

fn session_error(e: SessionError) -> (StatusCode, String) {
    match e {
        SessionError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health & Discovery
// ============================================================

pub async fn root() -> &'static str {
    "Food Ordering MCP Server"
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len(),
    }))
}

pub async fn openapi_schema(State(state): State<AppState>) -> impl IntoResponse {
    Json(schema::openapi_document(&state.api_url))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}

// ============================================================
// Chat Sessions
// ============================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionBody {
    pub platform: Option<String>,
}

pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionBody>>,
) -> Result<(StatusCode, Json<CreatedSession>), (StatusCode, String)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let platform = match body.platform.as_deref() {
        Some(raw) => Some(Platform::parse(raw).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Unknown platform '{}'. Must be: gpt, web, or mobile", raw),
        ))?),
        None => None,
    };

    let created = state.sessions.create(platform);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    state.sessions.get(id).map(Json).map_err(session_error)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .sessions
        .delete(id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(session_error)
}

#[derive(Debug, Deserialize)]
pub struct TurnBody {
    pub input: String,
}

pub async fn post_turn(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TurnBody>,
) -> Result<Json<TurnOutcome>, (StatusCode, String)> {
    state
        .sessions
        .turn(id, &body.input)
        .await
        .map(Json)
        .map_err(session_error)
}

#[derive(Debug, Serialize)]
pub struct TrackedOrderResponse {
    pub order_id: Option<String>,
    pub order: Option<Order>,
}

pub async fn get_tracked_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrackedOrderResponse>, (StatusCode, String)> {
    let snapshot = state.sessions.get(id).map_err(session_error)?;
    let order = state.sessions.tracked_order(id).map_err(session_error)?;
    Ok(Json(TrackedOrderResponse {
        order_id: snapshot.last_order_id,
        order,
    }))
}

// ============================================================
// Favorites
// ============================================================

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub restaurants: Vec<String>,
    pub dishes: Vec<String>,
}

pub async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<FavoritesResponse>, (StatusCode, String)> {
    let Some(favorites) = &state.favorites else {
        return Ok(Json(FavoritesResponse {
            restaurants: Vec::new(),
            dishes: Vec::new(),
        }));
    };
    Ok(Json(FavoritesResponse {
        restaurants: favorites.restaurants().map_err(internal_error)?,
        dishes: favorites.dishes().map_err(internal_error)?,
    }))
}
