//! Shared fixtures for the events handler tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use domain_events::*;
use http_body_util::BodyExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const BASE: &str = "/api/v3/app/events";
pub const BOUNDARY: &str = "events-test-boundary";

/// In-memory repository ordered the same way as the MongoDB one.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    state: Arc<RepoState>,
}

#[derive(Default)]
struct RepoState {
    events: Mutex<Vec<Event>>,
    uid: AtomicI64,
    failing: AtomicBool,
}

impl InMemoryEventRepository {
    /// Every subsequent call fails with a database error
    pub fn fail(&self) {
        self.state.failing.store(true, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Vec<Event> {
        self.state.events.lock().await.clone()
    }

    pub async fn push_attendee(&self, id: &ObjectId, attendee: ObjectId) {
        let mut events = self.state.events.lock().await;
        if let Some(event) = events.iter_mut().find(|e| e.id == *id) {
            event.attendees.push(attendee);
        }
    }

    fn check(&self) -> Result<()> {
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(EventError::database("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn next_uid(&self) -> Result<i64> {
        self.check()?;
        Ok(self.state.uid.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn create(&self, event: NewEvent) -> Result<ObjectId> {
        self.check()?;
        let id = ObjectId::new();
        self.state.events.lock().await.push(event.with_id(id));
        Ok(id)
    }

    async fn get_by_id(&self, id: &ObjectId) -> Result<Option<Event>> {
        self.check()?;
        Ok(self.state.events.lock().await.iter().find(|e| e.id == *id).cloned())
    }

    async fn list_latest(&self, page: Pagination) -> Result<Vec<Event>> {
        self.check()?;
        let mut events = self.state.events.lock().await.clone();
        events.sort_by(|a, b| b.schedule.cmp(&a.schedule).then(b.id.cmp(&a.id)));
        Ok(events
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn update(&self, id: &ObjectId, changes: EventChanges) -> Result<bool> {
        self.check()?;
        let mut events = self.state.events.lock().await;
        match events.iter_mut().find(|e| e.id == *id) {
            Some(event) => {
                event.apply_changes(changes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        self.check()?;
        let mut events = self.state.events.lock().await;
        let before = events.len();
        events.retain(|e| e.id != *id);
        Ok(events.len() < before)
    }
}

/// Blob store that keeps uploads in memory and names them `mem/<n>`
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<Vec<(String, Vec<u8>)>>,
    counter: AtomicUsize,
}

impl InMemoryBlobStore {
    pub async fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .await
            .iter()
            .find(|(name, _)| name == reference)
            .map(|(_, bytes)| bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        let reference = format!("mem/{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.blobs
            .lock()
            .await
            .push((reference.clone(), upload.bytes.to_vec()));
        Ok(reference)
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: InMemoryEventRepository,
    pub blobs: Arc<InMemoryBlobStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = InMemoryEventRepository::default();
        let blobs = Arc::new(InMemoryBlobStore::default());
        let service = EventService::new(repo.clone(), AttachmentResolver::new(blobs.clone()));
        let router = Router::new().nest(
            BASE,
            events_router::<InMemoryEventRepository>().with_state(Arc::new(service)),
        );

        Self {
            router,
            repo,
            blobs,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, query: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(format!("{BASE}?{query}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn create(&self, form: Multipart) -> Response<Body> {
        self.send(form.request("POST", BASE)).await
    }

    /// Creates an event and returns its id, panicking on anything but 201
    pub async fn create_ok(&self, form: Multipart) -> String {
        let response = self.create(form).await;
        assert_eq!(response.status(), 201);
        let body: CreatedResponse = json_body(response.into_body()).await;
        body.id
    }

    pub async fn update(&self, id: &str, form: Multipart) -> Response<Body> {
        self.send(form.request("PUT", &format!("{BASE}/{id}"))).await
    }

    pub async fn delete(&self, id: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(format!("{BASE}/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// Minimal `multipart/form-data` body builder
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with the two required fields set
    pub fn event(name: &str, schedule: &str, rigor_rank: &str) -> Self {
        Self::new()
            .text("name", name)
            .text("schedule", schedule)
            .text("rigor_rank", rigor_rank)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn request(mut self, method: &str, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

// Helper to parse JSON response body
pub async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
