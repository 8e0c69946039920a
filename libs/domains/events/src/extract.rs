//! Request extractors for the events routes

use crate::attachments::IMAGE_FIELD;
use crate::models::{EventInput, EventSubmission, Upload};
use crate::query::ListQuery;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum_helpers::AppError;
use tracing::debug;

/// Query string of `GET /`, rejected as a JSON `BAD_REQUEST` when it cannot
/// be deserialized (e.g. a repeated `type` or `id` key).
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListQuery>::from_request_parts(parts, state).await?;
        Ok(query)
    }
}

/// Accepts `multipart/form-data` (text fields plus at most one file under
/// `files[image]`) or `application/json` (text fields only).
impl<S> FromRequest<S> for EventSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(input) = Json::<EventInput>::from_request(req, state).await?;
            Ok(Self { input, image: None })
        } else {
            Err(AppError::BadRequest(
                "Expected a multipart/form-data or application/json body".to_string(),
            ))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<EventSubmission, AppError> {
    let mut submission = EventSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            if !submission.input.set_field(&name, value) {
                debug!(field = %name, "Ignoring unknown form field");
            }
            continue;
        };

        if name != IMAGE_FIELD {
            return Err(AppError::BadRequest(format!(
                "Unexpected file field '{name}', only '{IMAGE_FIELD}' is accepted"
            )));
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        // Browsers send an empty, unnamed part when no file was picked.
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        if submission.image.is_some() {
            return Err(AppError::BadRequest(format!(
                "At most one file may be uploaded under '{IMAGE_FIELD}'"
            )));
        }

        submission.image = Some(Upload {
            file_name: Some(file_name),
            content_type,
            bytes,
        });
    }

    Ok(submission)
}
