use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "disabled").
    pub status: String,
    /// Number of groups currently hosting a game.
    pub active_games: usize,
}

impl HealthResponse {
    /// Create a health response indicating the game handler is running.
    pub fn ok(active_games: usize) -> Self {
        Self {
            status: "ok".to_string(),
            active_games,
        }
    }

    /// Create a health response indicating the game handler is switched off.
    pub fn disabled() -> Self {
        Self {
            status: "disabled".to_string(),
            active_games: 0,
        }
    }
}
