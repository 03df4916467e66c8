use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use scout::session::{ChatEntry, ChatSession};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    id: Uuid,
    messages: Vec<ChatEntry>,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id(),
            messages: session.entries().to_vec(),
        }
    }
}

/// Unparseable ids are treated like unknown ones
pub(crate) fn parse_id(id: &str) -> Result<Uuid, StatusCode> {
    Uuid::parse_str(id).map_err(|_| StatusCode::NOT_FOUND)
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionResponse::from(&session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let id = parse_id(&id)?;
    let session = state.sessions.get(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    // The lock is held for the whole of a running turn
    let session = session.try_lock().map_err(|_| StatusCode::CONFLICT)?;
    Ok(Json(SessionResponse::from(&*session)))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let Ok(id) = parse_id(&id) else {
        return StatusCode::NOT_FOUND;
    };
    if state.sessions.remove(&id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .with_state(state)
}
