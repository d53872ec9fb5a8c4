use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;

use crate::{
    app::AppState,
    error::{AppError, AppResult},
    model::{SectionOut, StatusOut},
    ops::events as ops_events,
};

pub async fn current_status(State(state): State<AppState>) -> Json<StatusOut> {
    Json(state.board.snapshot().await)
}

pub async fn section_status(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> AppResult<Json<SectionOut>> {
    let status = state.board.snapshot().await;
    match section.as_str() {
        "ongoing" => Ok(Json(status.ongoing)),
        "scheduled" => Ok(Json(status.scheduled)),
        other => Err(AppError::BadRequest(format!(
            "unknown section {other:?}; expected ongoing or scheduled"
        ))),
    }
}

pub async fn stream_status(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (initial, rx) = state.board.watch().await;
    ops_events::sse_response(rx, initial)
}

pub async fn request_refresh(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    state.refresh.request()?;
    tracing::info!("feed refresh requested via api");
    Ok(Json(serde_json::json!({ "ok": true })))
}
