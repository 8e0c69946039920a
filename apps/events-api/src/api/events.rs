//! Events API routes
//!
//! Wires the events domain to MongoDB and the local upload directory.

use crate::state::AppState;
use axum::Router;
use domain_events::{AttachmentResolver, EventService, LocalBlobStore, MongoEventRepository};
use std::sync::Arc;
use tracing::info;

/// Create the events router
pub fn router(state: &AppState) -> Router {
    let repository = MongoEventRepository::new(&state.db);
    let blobs = LocalBlobStore::new(&state.config.upload.dir);
    let service = EventService::new(repository, AttachmentResolver::new(Arc::new(blobs)));

    domain_events::events_router().with_state(Arc::new(service))
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoEventRepository::new(db);
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}

/// Create the upload directory if needed
pub async fn init_upload_dir(state: &AppState) -> eyre::Result<()> {
    let blobs = LocalBlobStore::new(&state.config.upload.dir);
    blobs
        .ensure_root()
        .await
        .map_err(|e| eyre::eyre!("Failed to prepare upload directory: {}", e))?;
    info!(dir = %blobs.root().display(), "Upload directory ready");
    Ok(())
}
