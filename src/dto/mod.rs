/// Inbound chat events and their outcome.
pub mod event;
/// Health check payload.
pub mod health;
/// Outbound group notifications.
pub mod notification;
/// Server-Sent Events envelope.
pub mod sse;
/// Field validators shared by DTOs and configuration.
pub mod validation;
