//! Events Domain
//!
//! Catalog of scheduled events stored in MongoDB, each with an optional
//! image attachment.
//!
//! # Architecture
//!
//! ```text
//! GET    /events?id=<hex>            ─┐
//! GET    /events?type=latest&limit&page├─► handlers ─► EventService ─┬─► EventRepository (MongoDB)
//! POST   /events       (multipart)    │                             │
//! PUT    /events/{id}  (multipart)    │                             └─► AttachmentResolver ─► BlobStore
//! DELETE /events/{id}                ─┘
//! ```
//!
//! Create and update take a `multipart/form-data` body whose text fields
//! map onto [`EventInput`] and whose optional single file arrives under
//! [`IMAGE_FIELD`]. A JSON body with the same text fields is accepted too.
//!
//! `uid` comes from a persisted counter, so it stays unique across
//! restarts and concurrent creates.

use utoipa::OpenApi;

mod attachments;
mod error;
mod extract;
mod handlers;
mod models;
mod mongodb;
mod query;
mod repository;
mod service;

pub use attachments::{AttachmentResolver, BlobStore, IMAGE_FIELD, LocalBlobStore};
pub use error::{EventError, Result};
pub use handlers::{EventsState, events_router};
pub use models::{
    CreatedResponse, EVENT_TYPE, Event, EventChanges, EventFields, EventFiles, EventInput,
    EventQueryResponse, EventResponse, EventSubmission, MessageResponse, NewEvent, Upload,
    parse_schedule,
};
pub use mongodb::{COUNTERS_COLLECTION, EVENTS_COLLECTION, MongoEventRepository};
pub use query::{DEFAULT_LIMIT, DEFAULT_PAGE, EventSelector, ListQuery, MAX_LIMIT, Pagination};
pub use repository::EventRepository;
pub use service::EventService;

pub use ::mongodb::bson::oid::ObjectId;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::query_events,
        handlers::create_event,
        handlers::update_event,
        handlers::delete_event,
    ),
    components(
        schemas(
            EventResponse,
            EventQueryResponse,
            EventFiles,
            EventInput,
            models::EventForm,
            CreatedResponse,
            MessageResponse,
            axum_helpers::ErrorResponse,
        ),
        responses(
            axum_helpers::errors::responses::BadRequestResponse,
            axum_helpers::errors::responses::BadRequestValidationResponse,
            axum_helpers::errors::responses::BadRequestInvalidIdResponse,
            axum_helpers::errors::responses::NotFoundResponse,
            axum_helpers::errors::responses::InternalServerErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Event catalog with optional image attachments")
    )
)]
pub struct ApiDoc;
