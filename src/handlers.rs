// handlers.rs
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

use crate::error::{ApiError, AppError};
use crate::models::{CreateChoiceRequest, CreatePollRequest};
use crate::services::PollService;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))
}

pub async fn root() -> &'static str {
    "Hello World"
}

/// Create a poll, defaulting its expiration to thirty days out
pub async fn create_poll(
    State(service): State<PollService>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body(payload)?;
    let poll = service.create_poll(request.title, request.expire_at).await?;
    Ok((StatusCode::CREATED, Json(poll)))
}

/// List every poll
pub async fn list_polls(State(service): State<PollService>) -> Result<impl IntoResponse, ApiError> {
    let polls = service.list_polls().await?;
    Ok(Json(polls))
}

pub async fn get_poll(
    State(service): State<PollService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let poll = service.get_poll(&id).await?;
    Ok(Json(poll))
}

/// Attach a choice to an open poll
pub async fn create_choice(
    State(service): State<PollService>,
    payload: Result<Json<CreateChoiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body(payload)?;
    let choice = service
        .create_choice(request.title, request.poll_id)
        .await
        .map_err(|e| e.on_store_failure(StatusCode::NOT_FOUND))?;
    Ok((StatusCode::CREATED, Json(choice)))
}

pub async fn list_choices(
    State(service): State<PollService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let choices = service.list_choices_for_poll(&id).await?;
    Ok(Json(choices))
}

/// Vote for a choice
pub async fn cast_vote(
    State(service): State<PollService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vote = service.cast_vote(&id).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

/// Current leading choice of a poll
pub async fn get_result(
    State(service): State<PollService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = service
        .compute_result(&id)
        .await
        .map_err(|e| e.on_store_failure(StatusCode::NOT_FOUND))?;
    Ok(Json(result))
}
