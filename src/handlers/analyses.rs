// Read endpoints: listing, single record, stats, event replay.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures_util::stream::{self, Stream};
use serde::Serialize;

use crate::app::AppState;
use crate::models::{AnalysisRecord, StatsSummary};
use crate::utils::ServiceError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub items: Vec<AnalysisRecord>,
    pub has_more: bool,
    pub total: usize,
}

pub async fn list_analyses(State(state): State<AppState>) -> Json<ListResponse> {
    let items = state.store.list().await;
    let total = items.len();
    Json(ListResponse {
        items,
        has_more: false,
        total,
    })
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisRecord>, ServiceError> {
    state
        .store
        .get(&id)
        .await
        .map(Json)
        .ok_or(ServiceError::NotFound)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSummary> {
    Json(state.store.compute_stats().await)
}

/// Replays the recorded pipeline events for one analysis as an SSE stream.
/// Runs are synchronous, so the full log already exists by the time any
/// client can ask for it.
pub async fn get_analysis_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServiceError> {
    let events = state
        .store
        .events_for(&id)
        .await
        .ok_or(ServiceError::NotFound)?;

    let stream = stream::iter(events.into_iter().map(|event| {
        let sse_event = Event::default().json_data(&event).unwrap_or_default();
        Ok::<_, Infallible>(sse_event)
    }));
    Ok(Sse::new(stream))
}
