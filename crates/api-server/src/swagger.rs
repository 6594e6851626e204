//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dialog Bridge API",
        version = "0.1.0",
        description = "Forwards bot conversation events to Dialog Analytics.\n\nNormalizes Messenger events into analytics records and manages the API credentials.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Configuration", description = "Dialog Analytics credentials"),
        (name = "Events", description = "Bot event ingestion and custom events"),
        (name = "Context", description = "Attached context and click-tracking links"),
        (name = "Operations", description = "Health and liveness checks"),
    ),
    paths(
        // Configuration
        crate::config_rest::get_config,
        crate::config_rest::save_config,
        // Events
        crate::event_rest::handle_incoming,
        crate::event_rest::handle_outgoing,
        crate::event_rest::handle_custom,
        // Context
        crate::context_rest::attach,
        crate::context_rest::detach,
        crate::context_rest::create_link,
        // Operations
        crate::rest::health_check,
        crate::rest::liveness,
    ),
    components(schemas(
        dialog_core::Credentials,
        dialog_core::Event,
        dialog_core::UserProfile,
        dialog_core::CustomEvent,
        crate::event_rest::EventResponse,
        crate::event_rest::MiddlewareOutcome,
        crate::event_rest::CustomEventResponse,
        crate::context_rest::AttachRequest,
        crate::context_rest::AttachResponse,
        crate::context_rest::LinkRequest,
        crate::context_rest::LinkResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
