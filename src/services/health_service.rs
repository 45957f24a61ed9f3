use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the game handler is enabled and how many groups host a game.
pub fn health_status(state: &SharedState) -> HealthResponse {
    if state.config().enabled() {
        HealthResponse::ok(state.games().store().len())
    } else {
        HealthResponse::disabled()
    }
}
