use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::event::{EventOutcome, InboundEvent},
    error::AppError,
    services::bomb_service,
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = InboundEvent,
    responses(
        (status = 200, description = "Event processed", body = EventOutcome),
        (status = 400, description = "Malformed or invalid event")
    )
)]
/// Feed one group chat message to the game and return the messages to deliver.
pub async fn post_event(
    State(state): State<SharedState>,
    payload: Result<Json<InboundEvent>, JsonRejection>,
) -> Result<Json<EventOutcome>, AppError> {
    let Json(event) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    event.validate()?;
    Ok(Json(bomb_service::handle_event(&state, event)))
}

/// Configure the inbound event endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/events", post(post_event))
}
