//! Event service layer

use crate::attachments::AttachmentResolver;
use crate::error::{EventError, Result};
use crate::models::{Event, EventChanges, EventSubmission, NewEvent};
use crate::query::Pagination;
use crate::repository::EventRepository;
use mongodb::bson::oid::ObjectId;
use tracing::{info, instrument};

/// Event service that coordinates the repository and attachment storage
pub struct EventService<R: EventRepository> {
    repository: R,
    attachments: AttachmentResolver,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R, attachments: AttachmentResolver) -> Self {
        Self {
            repository,
            attachments,
        }
    }

    /// Get event by its hex id
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Event> {
        let object_id = parse_id(id)?;
        self.repository
            .get_by_id(&object_id)
            .await?
            .ok_or_else(|| EventError::NotFound { id: id.to_string() })
    }

    /// One page of events, newest schedule first
    #[instrument(skip(self))]
    pub async fn list_latest(&self, page: Pagination) -> Result<Vec<Event>> {
        self.repository.list_latest(page).await
    }

    /// Validate, store the attachment, allocate a `uid`, then insert
    #[instrument(skip(self, submission), fields(has_image = submission.image.is_some()))]
    pub async fn create(&self, submission: EventSubmission) -> Result<ObjectId> {
        let changes = self.prepare(submission).await?;

        let uid = self.repository.next_uid().await?;
        let id = self.repository.create(NewEvent::new(uid, changes)).await?;

        info!(event_id = %id, uid, "Event created");
        Ok(id)
    }

    /// Full overwrite of the client-controlled fields.
    ///
    /// Fields missing from the submission are cleared, including the image
    /// when no file is sent.
    #[instrument(skip(self, submission), fields(has_image = submission.image.is_some()))]
    pub async fn update(&self, id: &str, submission: EventSubmission) -> Result<()> {
        let object_id = parse_id(id)?;
        let changes = self.prepare(submission).await?;

        if !self.repository.update(&object_id, changes).await? {
            return Err(EventError::NotFound { id: id.to_string() });
        }

        info!(event_id = %object_id, "Event updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let object_id = parse_id(id)?;

        if !self.repository.delete(&object_id).await? {
            return Err(EventError::NotFound { id: id.to_string() });
        }

        info!(event_id = %object_id, "Event deleted");
        Ok(())
    }

    async fn prepare(&self, submission: EventSubmission) -> Result<EventChanges> {
        let fields = submission.input.into_fields()?;
        let image = self.attachments.resolve(submission.image).await?;
        Ok(EventChanges { fields, image })
    }
}

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| EventError::InvalidId { id: id.to_string() })
}
