//! Event domain models

use axum::body::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::{EventError, Result};

/// Value of the `type` field on every stored event.
pub const EVENT_TYPE: &str = "event";

/// Attachment references of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventFiles {
    /// Stored-blob reference, `null` when no file was uploaded
    #[schema(example = "uploads/3f2a9c0e5b7d4e21a6c8f90b1d2e3f40")]
    pub image: Option<String>,
}

/// A persisted event document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: i64,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: bson::DateTime,
    pub description: Option<String>,
    #[serde(default)]
    pub files: EventFiles,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: i64,
    #[serde(default)]
    pub attendees: Vec<ObjectId>,
}

impl Event {
    /// Overwrites every client-controlled field.
    ///
    /// `id`, `kind`, `uid` and `attendees` are left untouched.
    pub fn apply_changes(&mut self, changes: EventChanges) {
        let EventChanges { fields, image } = changes;
        self.name = fields.name;
        self.tagline = fields.tagline;
        self.schedule = to_bson_datetime(fields.schedule);
        self.description = fields.description;
        self.files = EventFiles { image };
        self.moderator = fields.moderator;
        self.category = fields.category;
        self.sub_category = fields.sub_category;
        self.rigor_rank = fields.rigor_rank;
    }
}

/// An event about to be inserted; the store assigns `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: i64,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: bson::DateTime,
    pub description: Option<String>,
    pub files: EventFiles,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: i64,
    pub attendees: Vec<ObjectId>,
}

impl NewEvent {
    /// Fresh event of type [`EVENT_TYPE`] with no attendees.
    pub fn new(uid: i64, changes: EventChanges) -> Self {
        let EventChanges { fields, image } = changes;
        Self {
            kind: EVENT_TYPE.to_string(),
            uid,
            name: fields.name,
            tagline: fields.tagline,
            schedule: to_bson_datetime(fields.schedule),
            description: fields.description,
            files: EventFiles { image },
            moderator: fields.moderator,
            category: fields.category,
            sub_category: fields.sub_category,
            rigor_rank: fields.rigor_rank,
            attendees: Vec::new(),
        }
    }

    pub fn with_id(self, id: ObjectId) -> Event {
        Event {
            id,
            kind: self.kind,
            uid: self.uid,
            name: self.name,
            tagline: self.tagline,
            schedule: self.schedule,
            description: self.description,
            files: self.files,
            moderator: self.moderator,
            category: self.category,
            sub_category: self.sub_category,
            rigor_rank: self.rigor_rank,
            attendees: self.attendees,
        }
    }
}

/// Client-supplied fields after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: DateTime<Utc>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: i64,
}

/// Everything a create or a full-overwrite update writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChanges {
    pub fields: EventFields,
    /// Reference returned by the blob store, `None` clears the attachment
    pub image: Option<String>,
}

/// Raw event fields as submitted in a form or JSON body.
///
/// Every field is optional at this stage; [`EventInput::into_fields`]
/// enforces `schedule` and `rigor_rank`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct EventInput {
    #[schema(example = "Hack Night")]
    pub name: Option<String>,
    pub tagline: Option<String>,
    /// RFC 3339 date-time, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`
    #[schema(example = "2024-05-01")]
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Integer, given as a number or a numeric string
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>, example = "3")]
    pub rigor_rank: Option<String>,
}

impl EventInput {
    /// Assigns a form field by name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "name" => &mut self.name,
            "tagline" => &mut self.tagline,
            "schedule" => &mut self.schedule,
            "description" => &mut self.description,
            "moderator" => &mut self.moderator,
            "category" => &mut self.category,
            "sub_category" => &mut self.sub_category,
            "rigor_rank" => &mut self.rigor_rank,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Parses `schedule` and `rigor_rank`; both are required.
    pub fn into_fields(self) -> Result<EventFields> {
        let schedule = match self.schedule.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(EventError::validation("schedule is required"));
            }
            Some(raw) => parse_schedule(raw).ok_or_else(|| {
                EventError::validation(format!(
                    "schedule: '{raw}' is not an RFC 3339 date-time or YYYY-MM-DD date"
                ))
            })?,
        };

        let rigor_rank = match self.rigor_rank.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(EventError::validation("rigor_rank is required"));
            }
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                EventError::validation(format!("rigor_rank: '{raw}' is not an integer"))
            })?,
        };

        Ok(EventFields {
            name: self.name,
            tagline: self.tagline,
            schedule,
            description: self.description,
            moderator: self.moderator,
            category: self.category,
            sub_category: self.sub_category,
            rigor_rank,
        })
    }
}

/// Accepts `"3"`, `3` or `null` for a text field.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

/// Parses the date formats accepted for `schedule`.
///
/// Naive date-times and plain dates are taken as UTC; a plain date is
/// midnight.
pub fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub(crate) fn from_bson_datetime(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// An uploaded file, held in memory until the blob store persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A parsed create/update request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSubmission {
    pub input: EventInput,
    pub image: Option<Upload>,
}

/// Multipart form accepted by create and update (documentation only).
#[allow(dead_code)]
#[derive(Serialize, ToSchema)]
pub struct EventForm {
    name: Option<String>,
    tagline: Option<String>,
    /// RFC 3339 date-time, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`
    schedule: String,
    description: Option<String>,
    moderator: Option<String>,
    category: Option<String>,
    sub_category: Option<String>,
    /// Integer
    rigor_rank: String,
    /// Optional single attachment
    #[serde(rename = "files[image]")]
    #[schema(value_type = Option<String>, format = Binary)]
    files_image: Option<Vec<u8>>,
}

/// Event as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    #[schema(example = "665f1c2e9b1d4c3a2f0e1a2b")]
    pub id: String,
    #[serde(rename = "type")]
    #[schema(example = "event")]
    pub kind: String,
    pub uid: i64,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: DateTime<Utc>,
    pub description: Option<String>,
    pub files: EventFiles,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: i64,
    pub attendees: Vec<String>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_hex(),
            kind: event.kind,
            uid: event.uid,
            name: event.name,
            tagline: event.tagline,
            schedule: from_bson_datetime(event.schedule),
            description: event.description,
            files: event.files,
            moderator: event.moderator,
            category: event.category,
            sub_category: event.sub_category,
            rigor_rank: event.rigor_rank,
            attendees: event.attendees.into_iter().map(ObjectId::to_hex).collect(),
        }
    }
}

/// `GET` result: one event for `?id=`, a page for `?type=latest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EventQueryResponse {
    One(EventResponse),
    Many(Vec<EventResponse>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "665f1c2e9b1d4c3a2f0e1a2b")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Event updated successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(schedule: &str, rigor_rank: &str) -> EventInput {
        EventInput {
            name: Some("Hack Night".to_string()),
            schedule: Some(schedule.to_string()),
            rigor_rank: Some(rigor_rank.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_schedule_plain_date_is_midnight_utc() {
        assert_eq!(
            parse_schedule("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_schedule_accepts_offsets_and_naive_times() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 16, 30, 0).unwrap();
        assert_eq!(parse_schedule("2024-05-01T18:30:00+02:00"), Some(expected));
        assert_eq!(parse_schedule("2024-05-01T16:30:00Z"), Some(expected));
        assert_eq!(parse_schedule("2024-05-01T16:30:00"), Some(expected));
        assert_eq!(parse_schedule("2024-05-01 16:30:00"), Some(expected));
        assert_eq!(parse_schedule("2024-05-01T16:30"), Some(expected));
    }

    #[test]
    fn test_parse_schedule_rejects_garbage() {
        assert_eq!(parse_schedule("next tuesday"), None);
        assert_eq!(parse_schedule("2024-13-01"), None);
        assert_eq!(parse_schedule(""), None);
    }

    #[test]
    fn test_into_fields_parses_rank_and_schedule() {
        let fields = input("2024-05-01", " 3 ").into_fields().unwrap();
        assert_eq!(fields.rigor_rank, 3);
        assert_eq!(fields.schedule, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(fields.name.as_deref(), Some("Hack Night"));
        assert_eq!(fields.tagline, None);
    }

    #[test]
    fn test_into_fields_rejects_missing_or_malformed_values() {
        let missing_schedule = EventInput {
            rigor_rank: Some("1".into()),
            ..Default::default()
        };
        assert!(matches!(
            missing_schedule.into_fields(),
            Err(EventError::Validation { .. })
        ));

        assert!(matches!(
            input("not a date", "1").into_fields(),
            Err(EventError::Validation { .. })
        ));
        assert!(matches!(
            input("2024-05-01", "three").into_fields(),
            Err(EventError::Validation { .. })
        ));
        assert!(matches!(
            input("2024-05-01", "").into_fields(),
            Err(EventError::Validation { .. })
        ));
    }

    #[test]
    fn test_rigor_rank_accepts_json_number_or_string() {
        let from_number: EventInput =
            serde_json::from_str(r#"{"schedule":"2024-05-01","rigor_rank":7}"#).unwrap();
        let from_text: EventInput =
            serde_json::from_str(r#"{"schedule":"2024-05-01","rigor_rank":"7"}"#).unwrap();
        let absent: EventInput = serde_json::from_str(r#"{"schedule":"2024-05-01"}"#).unwrap();

        assert_eq!(from_number.rigor_rank.as_deref(), Some("7"));
        assert_eq!(from_text.rigor_rank.as_deref(), Some("7"));
        assert_eq!(absent.rigor_rank, None);
    }

    #[test]
    fn test_fractional_rigor_rank_is_rejected() {
        let input: EventInput =
            serde_json::from_str(r#"{"schedule":"2024-05-01","rigor_rank":2.5}"#).unwrap();
        assert!(matches!(input.into_fields(), Err(EventError::Validation { .. })));
    }

    #[test]
    fn test_set_field_ignores_unknown_names() {
        let mut input = EventInput::default();
        assert!(input.set_field("moderator", "ada".into()));
        assert!(!input.set_field("attendees", "x".into()));
        assert_eq!(input.moderator.as_deref(), Some("ada"));
    }

    #[test]
    fn test_new_event_defaults() {
        let fields = input("2024-05-01", "3").into_fields().unwrap();
        let event = NewEvent::new(
            9,
            EventChanges {
                fields,
                image: None,
            },
        );

        assert_eq!(event.kind, EVENT_TYPE);
        assert_eq!(event.uid, 9);
        assert!(event.attendees.is_empty());
        assert_eq!(event.files.image, None);
    }

    #[test]
    fn test_apply_changes_preserves_identity() {
        let fields = input("2024-05-01", "3").into_fields().unwrap();
        let attendee = ObjectId::new();
        let mut event = NewEvent::new(
            4,
            EventChanges {
                fields,
                image: Some("uploads/a".into()),
            },
        )
        .with_id(ObjectId::new());
        event.attendees.push(attendee);
        let id = event.id;

        let mut replacement = input("2025-01-01", "8").into_fields().unwrap();
        replacement.name = None;
        event.apply_changes(EventChanges {
            fields: replacement,
            image: None,
        });

        assert_eq!(event.id, id);
        assert_eq!(event.uid, 4);
        assert_eq!(event.kind, EVENT_TYPE);
        assert_eq!(event.attendees, vec![attendee]);
        assert_eq!(event.name, None);
        assert_eq!(event.rigor_rank, 8);
        assert_eq!(event.files.image, None);
    }

    #[test]
    fn test_event_serializes_with_mongo_field_names() {
        let fields = input("2024-05-01", "3").into_fields().unwrap();
        let event = NewEvent::new(1, EventChanges { fields, image: None }).with_id(ObjectId::new());
        let doc = bson::to_document(&event).unwrap();

        assert!(doc.get_object_id("_id").is_ok());
        assert_eq!(doc.get_str("type").unwrap(), "event");
        assert!(doc.get_datetime("schedule").is_ok());
        assert_eq!(
            doc.get_document("files").unwrap().get("image"),
            Some(&bson::Bson::Null)
        );
        assert!(doc.get_array("attendees").unwrap().is_empty());
    }

    #[test]
    fn test_event_response_renders_hex_ids_and_utc_schedule() {
        let fields = input("2024-05-01", "3").into_fields().unwrap();
        let attendee = ObjectId::new();
        let mut event = NewEvent::new(1, EventChanges { fields, image: None }).with_id(ObjectId::new());
        event.attendees.push(attendee);

        let json = serde_json::to_value(EventResponse::from(event.clone())).unwrap();

        assert_eq!(json["id"], event.id.to_hex());
        assert_eq!(json["type"], "event");
        assert_eq!(json["schedule"], "2024-05-01T00:00:00Z");
        assert_eq!(json["attendees"][0], attendee.to_hex());
        assert!(json["files"]["image"].is_null());
        assert!(json["tagline"].is_null());
    }
}
