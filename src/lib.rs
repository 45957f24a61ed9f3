//! Library crate for the digital bomb group game, exposing modules for binaries and tests.

/// Runtime configuration loading and validation.
pub mod config;
/// Wire types exchanged with the chat bridge.
pub mod dto;
/// Configuration, game rejection and HTTP error types.
pub mod error;
/// HTTP, SSE and WebSocket route trees.
pub mod routes;
/// Request handling logic behind the routes.
pub mod services;
/// Shared application state and the per-group game engine.
pub mod state;
