use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the digital bomb bridge.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::events::post_event,
        crate::routes::sse::notification_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::event::InboundEvent,
            crate::dto::event::EventOutcome,
            crate::dto::notification::Notification,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Inbound chat events from the bridge"),
        (name = "sse", description = "Server-sent notification stream"),
        (name = "bridge", description = "WebSocket bridge for chat platform adapters"),
    )
)]
pub struct ApiDoc;
