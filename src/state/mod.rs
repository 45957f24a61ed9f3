/// Game data model: players, ranges and phases.
pub mod game;
/// Injectable randomness for bomb draws and turn order.
pub mod random;
mod sse;
/// Transitions applied to a group's game.
pub mod state_machine;
/// Group-keyed game registry.
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;

pub use self::sse::SseHub;
use self::{
    random::{RandomSource, SeededRandom, ThreadRandom},
    state_machine::GameStateMachine,
};

/// Reference-counted handle to [`AppState`] shared by routes and services.
pub type SharedState = Arc<AppState>;

/// Capacity of the notification broadcast channel.
const NOTIFICATION_CAPACITY: usize = 64;

/// Central application state: configuration, games and the notification hub.
pub struct AppState {
    config: Arc<AppConfig>,
    games: GameStateMachine,
    notifications: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Randomness comes from the configured seed when there is one, the thread RNG otherwise.
    pub fn new(config: AppConfig) -> SharedState {
        let random: Arc<dyn RandomSource> = match config.settings().seed {
            Some(seed) => {
                info!(seed, "using seeded randomness");
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(ThreadRandom),
        };
        Self::with_random(config, random)
    }

    /// Construct the state with an explicit randomness source.
    pub fn with_random(config: AppConfig, random: Arc<dyn RandomSource>) -> SharedState {
        let games = GameStateMachine::new(config.settings(), config.commands().clone(), random);
        Arc::new(Self {
            config: Arc::new(config),
            games,
            notifications: SseHub::new(NOTIFICATION_CAPACITY),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Per-group game state machine.
    pub fn games(&self) -> &GameStateMachine {
        &self.games
    }

    /// Broadcast hub carrying every produced notification.
    pub fn notifications(&self) -> &SseHub {
        &self.notifications
    }
}
