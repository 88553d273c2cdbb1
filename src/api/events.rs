//! Event log endpoints

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};

use crate::{
    error::AppResult,
    models::event::{EventQuery, EventRecord},
    AppState,
};

use super::ValidQuery;

/// Committed events in id order
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(EventQuery),
    responses(
        (status = 200, description = "Events after the given id", body = Vec<EventRecord>)
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<EventQuery>,
) -> AppResult<Json<Vec<EventRecord>>> {
    Ok(Json(state.services.events.list(&query)?))
}

/// Live feed of events as they commit (server-sent events)
#[utoipa::path(
    get,
    path = "/events/stream",
    tag = "events",
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String)
    )
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.services.events.subscribe()).filter_map(|message| {
        match message {
            Ok(record) => Event::default()
                .id(record.id.to_string())
                .event(record.event.name())
                .json_data(&record)
                .ok()
                .map(Ok),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("Event subscriber lagged, {} events skipped", skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
