use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{check_auth, lock_db};
use crate::models::ConversationEntry;
use crate::services::conversation::{self, AssistantTurn};
use crate::state::AppState;

const ENTRY_EVENT: &str = "conversation_entry";

// POST /api/assistant/command
#[derive(Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn submit_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CommandRequest>,
) -> Result<Json<AssistantTurn>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let turn = conversation::process_utterance(&state, &body.text).await?;
    Ok(Json(turn))
}

// GET /api/assistant/conversation
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ConversationEntry>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    Ok(Json(conversation::snapshot(&state)?))
}

// GET /api/assistant/status
#[derive(Serialize)]
pub struct StatusResponse {
    upcoming_count: i64,
    conversation_length: usize,
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let now = state.clock.now();
    let upcoming_count = {
        let db = lock_db(&state)?;
        queries::count_upcoming(&db, &now)?
    };

    Ok(Json(StatusResponse {
        upcoming_count,
        conversation_length: conversation::conversation_len(&state)?,
    }))
}

// GET /api/assistant/events (SSE)
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    let token = query.token.as_deref().unwrap_or("");
    if token != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    let (catchup, rx) = conversation::subscribe(&state)?;

    let catchup_stream = tokio_stream::iter(
        catchup
            .into_iter()
            .map(|entry| Ok::<_, Infallible>(entry_event(&entry))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => Some(Ok(entry_event(&entry))),
        Err(e) => {
            tracing::warn!(error = %e, "conversation subscriber lagged");
            None
        }
    });

    let keepalive = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
        Duration::from_secs(30),
    ))
    .map(|_| Ok(Event::default().comment("keepalive")));

    let stream = catchup_stream.chain(live_stream).merge(keepalive);

    Ok(Sse::new(stream))
}

fn entry_event(entry: &ConversationEntry) -> Event {
    let data = serde_json::to_string(entry).unwrap_or_default();
    Event::default().data(data).event(ENTRY_EVENT)
}
