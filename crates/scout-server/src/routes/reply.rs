use crate::routes::session::parse_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::Stream;
use scout::models::event::AgentEvent;
use scout::turn::{run_turn, TurnError};
use serde::Deserialize;
use serde_json::json;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    prompt: String,
    /// Overrides the server's key for this turn
    #[serde(default)]
    api_key: Option<String>,
}

/// Server-sent events, one frame per agent event
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> axum::response::Response {
        let body = axum::body::Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

// Protocol-specific frame formatting
struct SseFormatter;

impl SseFormatter {
    fn format_frame(kind: &str, data: &serde_json::Value) -> String {
        format!("event: {}\ndata: {}\n\n", kind, data)
    }

    fn format_event(event: &AgentEvent) -> String {
        let data = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
        Self::format_frame(event.kind(), &data)
    }

    fn format_error(error: &TurnError) -> String {
        Self::format_frame("error", &json!({ "message": error.to_string() }))
    }

    fn format_done() -> String {
        Self::format_frame("done", &json!({}))
    }
}

async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ReplyRequest>,
) -> Result<SseResponse, StatusCode> {
    // Check protocol header (optional)
    if let Some(protocol) = headers.get("x-protocol") {
        if protocol.to_str().map(|p| p != "sse").unwrap_or(true) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let id = parse_id(&id)?;
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    // One turn at a time per session
    let mut session = session
        .try_lock_owned()
        .map_err(|_| StatusCode::CONFLICT)?;

    let (tx, rx) = mpsc::channel(100);
    let stream = ReceiverStream::new(rx);

    tokio::spawn(async move {
        let agent = match state.agent_config.build(request.api_key.as_deref()) {
            Ok(agent) => agent,
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "could not start turn");
                let _ = tx.send(SseFormatter::format_error(&e)).await;
                let _ = tx.send(SseFormatter::format_done()).await;
                return;
            }
        };

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let turn = run_turn(&mut session, &agent, &request.prompt, event_tx);
        tokio::pin!(turn);

        let outcome = loop {
            tokio::select! {
                result = &mut turn => break Some(result),
                Some(event) = event_rx.recv() => {
                    if tx.send(SseFormatter::format_event(&event)).await.is_err() {
                        break None;
                    }
                }
                // Heartbeat, used to detect disconnected clients and then abandon the turn
                _ = sleep(Duration::from_millis(500)) => {
                    if tx.is_closed() {
                        break None;
                    }
                }
            }
        };

        match outcome {
            Some(result) => {
                while let Ok(event) = event_rx.try_recv() {
                    let _ = tx.send(SseFormatter::format_event(&event)).await;
                }
                if let Err(e) = result {
                    tracing::warn!(session = %id, error = %e, "turn failed");
                    let _ = tx.send(SseFormatter::format_error(&e)).await;
                }
                let _ = tx.send(SseFormatter::format_done()).await;
            }
            None => {
                tracing::info!(session = %id, "client disconnected, turn abandoned");
            }
        }

        state.sessions.touch(&id).await;
    });

    Ok(SseResponse::new(stream))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions/:id/reply", post(handler))
        .with_state(state)
}
