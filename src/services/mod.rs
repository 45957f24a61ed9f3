/// Inbound chat event handling for the digital bomb game.
pub mod bomb_service;
/// Chat message classification.
pub mod command;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events notification broadcasting.
pub mod sse_service;
/// WebSocket bridge connection handling.
pub mod websocket_service;
