use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI routes.
pub mod docs;
/// Chat event intake over HTTP.
pub mod events;
/// Health check route.
pub mod health;
/// Notification stream over Server-Sent Events.
pub mod sse;
/// WebSocket bridge route.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(events::router())
        .merge(sse::router())
        .merge(websocket::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
