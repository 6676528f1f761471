// handlers.rs
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use http::StatusCode;

use crate::error::AppError;
use crate::models::{CreatePollRequest, PollCreated, PollSnapshot, VoteRequest, VoteResults};
use crate::state::AppState;

/// Open a new poll, replacing whichever poll was active.
pub async fn create_poll(
    State(state): State<AppState>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PollCreated>), AppError> {
    let Json(body) = payload.map_err(|_| AppError::validation("Question is required."))?;
    let created = state.service.create_poll(body.question).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Cast a vote for the active poll.
pub async fn submit_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VoteResults>), AppError> {
    let Json(body) =
        payload.map_err(|_| AppError::validation("User ID and option are required."))?;
    let results = state.service.submit_vote(body).await?;
    Ok((StatusCode::CREATED, Json(results)))
}

/// Current active poll plus totals; the resync path for subscribers that
/// missed broadcast events.
pub async fn poll_snapshot(
    State(state): State<AppState>,
) -> Result<Json<PollSnapshot>, AppError> {
    Ok(Json(state.service.snapshot().await?))
}
