//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Events API",
        version = "0.1.0",
        description = "Event catalog with MongoDB storage and image uploads",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/v3/app/events", api = domain_events::ApiDoc)
    ),
    tags(
        (name = "events", description = "Event catalog with optional image attachments")
    )
)]
pub struct ApiDoc;
