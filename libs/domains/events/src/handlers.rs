//! HTTP handlers for events API

use crate::error::EventError;
use crate::models::{
    CreatedResponse, EventQueryResponse, EventResponse, EventSubmission, MessageResponse,
};
use crate::query::{EventSelector, ListQuery};
use crate::repository::EventRepository;
use crate::service::EventService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use axum_helpers::AppError;
use axum_helpers::errors::responses::{
    BadRequestInvalidIdResponse, BadRequestResponse, BadRequestValidationResponse,
    InternalServerErrorResponse, NotFoundResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

/// Create the events router
pub fn events_router<R: EventRepository + 'static>() -> Router<EventsState<R>> {
    Router::new()
        .route("/", get(query_events::<R>).post(create_event::<R>))
        .route("/{id}", put(update_event::<R>).delete(delete_event::<R>))
}

/// Fetch one event by `id`, or a page of the latest events with `type=latest`
#[utoipa::path(
    get,
    path = "",
    params(ListQuery),
    responses(
        (status = 200, description = "The event for `id`, or a page sorted by schedule (newest first) for `type=latest`", body = EventQueryResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn query_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    query: ListQuery,
) -> Result<Json<EventQueryResponse>, AppError> {
    let response = match query.into_selector()? {
        EventSelector::ById(id) => EventQueryResponse::One(state.get(&id).await?.into()),
        EventSelector::Latest(page) => {
            let events = state.list_latest(page).await?;
            EventQueryResponse::Many(events.into_iter().map(EventResponse::from).collect())
        }
    };
    Ok(Json(response))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "",
    request_body(
        description = "Event fields; an optional image goes under `files[image]`",
        content(
            (crate::models::EventForm = "multipart/form-data"),
            (crate::models::EventInput = "application/json")
        )
    ),
    responses(
        (status = 201, description = "Event created", body = CreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, submission))]
pub async fn create_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    submission: EventSubmission,
) -> Result<impl IntoResponse, EventError> {
    let id = state.create(submission).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.to_hex() })))
}

/// Replace an event's fields; anything not sent is cleared
#[utoipa::path(
    put,
    path = "/{id}",
    params(
        ("id" = String, Path, description = "Event ID (24 hex characters)")
    ),
    request_body(
        content(
            (crate::models::EventForm = "multipart/form-data"),
            (crate::models::EventInput = "application/json")
        )
    ),
    responses(
        (status = 200, description = "Event updated", body = MessageResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, submission))]
pub async fn update_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Path(id): Path<String>,
    submission: EventSubmission,
) -> Result<Json<MessageResponse>, EventError> {
    state.update(&id, submission).await?;
    Ok(Json(MessageResponse::new("Event updated successfully")))
}

/// Delete event by ID
#[utoipa::path(
    delete,
    path = "/{id}",
    params(
        ("id" = String, Path, description = "Event ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn delete_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, EventError> {
    state.delete(&id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
