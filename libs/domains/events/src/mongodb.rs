//! MongoDB implementation of EventRepository

use crate::error::{EventError, Result};
use crate::models::{Event, EventChanges, NewEvent, to_bson_datetime};
use crate::query::Pagination;
use crate::repository::EventRepository;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::instrument;

pub const EVENTS_COLLECTION: &str = "events";
pub const COUNTERS_COLLECTION: &str = "counters";

/// `_id` of the counter document backing `uid`
const EVENT_UID_COUNTER: &str = "event_uid";

/// MongoDB-based event repository
#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<Event>,
    counters: Collection<Document>,
}

impl MongoEventRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(EVENTS_COLLECTION),
            counters: database.collection(COUNTERS_COLLECTION),
        }
    }

    /// Create indexes for the latest listing and `uid` uniqueness
    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;
        use mongodb::options::IndexOptions;

        let indexes = vec![
            IndexModel::builder().keys(latest_sort()).build(),
            IndexModel::builder()
                .keys(doc! { "uid": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

/// Newest schedule first; `_id` makes equal schedules page deterministically.
fn latest_sort() -> Document {
    doc! { "schedule": -1, "_id": -1 }
}

/// `$set` for a full overwrite of the client-controlled fields.
fn build_update(changes: &EventChanges) -> Document {
    let fields = &changes.fields;
    doc! {
        "$set": {
            "name": fields.name.clone(),
            "tagline": fields.tagline.clone(),
            "schedule": to_bson_datetime(fields.schedule),
            "description": fields.description.clone(),
            "files": { "image": changes.image.clone() },
            "moderator": fields.moderator.clone(),
            "category": fields.category.clone(),
            "sub_category": fields.sub_category.clone(),
            "rigor_rank": fields.rigor_rank,
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self))]
    async fn next_uid(&self) -> Result<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": EVENT_UID_COUNTER },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .with_options(options)
            .await?;

        counter
            .and_then(|doc| doc.get_i64("seq").ok())
            .ok_or_else(|| EventError::Internal {
                message: "uid counter returned no sequence value".to_string(),
            })
    }

    #[instrument(skip(self, event), fields(uid = event.uid))]
    async fn create(&self, event: NewEvent) -> Result<ObjectId> {
        let result = self
            .collection
            .clone_with_type::<NewEvent>()
            .insert_one(&event)
            .await?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| EventError::Internal {
                message: format!("unexpected inserted id: {}", result.inserted_id),
            })
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &ObjectId) -> Result<Option<Event>> {
        let event = self.collection.find_one(doc! { "_id": *id }).await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn list_latest(&self, page: Pagination) -> Result<Vec<Event>> {
        let options = FindOptions::builder()
            .sort(latest_sort())
            .skip(page.skip())
            .limit(page.limit() as i64)
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        let events: Vec<Event> = cursor.try_collect().await?;
        Ok(events)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: &ObjectId, changes: EventChanges) -> Result<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": *id }, build_update(&changes))
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventFields;
    use chrono::{TimeZone, Utc};
    use mongodb::bson::Bson;

    fn changes(image: Option<&str>) -> EventChanges {
        EventChanges {
            fields: EventFields {
                name: Some("Hack Night".to_string()),
                tagline: None,
                schedule: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                description: Some("bring a laptop".to_string()),
                moderator: None,
                category: Some("tech".to_string()),
                sub_category: None,
                rigor_rank: 3,
            },
            image: image.map(String::from),
        }
    }

    #[test]
    fn test_build_update_sets_every_writable_field() {
        let update = build_update(&changes(Some("uploads/abc")));
        let set = update.get_document("$set").unwrap();

        let mut keys: Vec<&str> = set.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "category",
                "description",
                "files",
                "moderator",
                "name",
                "rigor_rank",
                "schedule",
                "sub_category",
                "tagline",
            ]
        );
        assert_eq!(set.get_i64("rigor_rank").unwrap(), 3);
        assert_eq!(
            set.get_datetime("schedule").unwrap().timestamp_millis(),
            1_714_521_600_000
        );
        assert_eq!(
            set.get_document("files").unwrap().get_str("image").unwrap(),
            "uploads/abc"
        );
    }

    #[test]
    fn test_build_update_never_touches_identity_fields() {
        let update = build_update(&changes(None));
        let set = update.get_document("$set").unwrap();

        for key in ["_id", "type", "uid", "attendees"] {
            assert!(!set.contains_key(key), "{key} must not be overwritten");
        }
    }

    #[test]
    fn test_build_update_nulls_absent_fields() {
        let update = build_update(&changes(None));
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get("tagline"), Some(&Bson::Null));
        assert_eq!(
            set.get_document("files").unwrap().get("image"),
            Some(&Bson::Null)
        );
    }

    #[test]
    fn test_latest_sort_order() {
        let sort = latest_sort();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, ["schedule", "_id"]);
        assert_eq!(sort.get_i32("schedule").unwrap(), -1);
        assert_eq!(sort.get_i32("_id").unwrap(), -1);
    }
}
