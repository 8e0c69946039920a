//! API routes module

pub mod events;
pub mod health;

use axum::Router;
use axum::extract::DefaultBodyLimit;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest(
            "/v3/app/events",
            events::router(state).layer(DefaultBodyLimit::max(state.config.upload.max_bytes)),
        )
        .merge(health::router(state.clone()))
}
