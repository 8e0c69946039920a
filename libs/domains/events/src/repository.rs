//! Event repository trait

use crate::error::Result;
use crate::models::{Event, EventChanges, NewEvent};
use crate::query::Pagination;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

/// Repository trait for event storage operations
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Next value of the persistent `uid` sequence
    async fn next_uid(&self) -> Result<i64>;

    /// Store a new event, returning the id the store assigned
    async fn create(&self, event: NewEvent) -> Result<ObjectId>;

    /// Get event by ID
    async fn get_by_id(&self, id: &ObjectId) -> Result<Option<Event>>;

    /// One page of events, newest `schedule` first with ties broken by id
    async fn list_latest(&self, page: Pagination) -> Result<Vec<Event>>;

    /// Overwrite the client-controlled fields. `false` if no event matched.
    async fn update(&self, id: &ObjectId, changes: EventChanges) -> Result<bool>;

    /// Delete event by ID. `false` if no event matched.
    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub EventRepository {}

        #[async_trait]
        impl EventRepository for EventRepository {
            async fn next_uid(&self) -> Result<i64>;
            async fn create(&self, event: NewEvent) -> Result<ObjectId>;
            async fn get_by_id(&self, id: &ObjectId) -> Result<Option<Event>>;
            async fn list_latest(&self, page: Pagination) -> Result<Vec<Event>>;
            async fn update(&self, id: &ObjectId, changes: EventChanges) -> Result<bool>;
            async fn delete(&self, id: &ObjectId) -> Result<bool>;
        }
    }
}
