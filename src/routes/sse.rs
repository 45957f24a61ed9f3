use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/notifications",
    tag = "sse",
    responses((status = 200, description = "Notification SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream every produced notification to delivery workers.
pub async fn notification_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_notifications(&state);
    info!(
        subscribers = state.notifications().subscriber_count(),
        "new notification SSE connection"
    );
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/notifications", get(notification_stream))
}
