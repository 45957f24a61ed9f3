use std::{io, path::PathBuf};

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dto::notification::Notification, state::game::UserId};

/// Reasons the configuration could not be used; any of them disables the game.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file `{}` not found", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The configuration file exists but could not be read.
    #[error("failed to read config file `{}`", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values are well-formed but unusable.
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Command misuse reported back to the group. The `Display` text is what players see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Signup attempted while a game is running.
    #[error("The game has already started, signups are closed!")]
    SignupClosed,
    /// The player is already on the roster.
    #[error("{nickname}, you have already signed up!")]
    AlreadySignedUp {
        /// Player that tried to sign up again.
        user_id: UserId,
        /// Display name of that player.
        nickname: String,
    },
    /// Start requested without any signup.
    #[error("No one has signed up yet, the game cannot start.")]
    NoPlayers,
    /// Start requested while a game is running.
    #[error("The game has already started!")]
    AlreadyStarted,
    /// Start requested with too few players.
    #[error("Not enough players: at least {required} are needed to start the game!")]
    NotEnoughPlayers {
        /// Configured minimum.
        required: usize,
        /// Players currently signed up.
        registered: usize,
    },
    /// Guess outside of the live range.
    #[error("{nickname}, the number must be between {min} and {max}!")]
    OutOfRange {
        /// Player whose turn it is.
        user_id: UserId,
        /// Display name of that player.
        nickname: String,
        /// Lower bound of the live range.
        min: i64,
        /// Upper bound of the live range.
        max: i64,
    },
}

impl Rejection {
    /// Render the rejection as a message to `group_id`, mentioning the player when there is one.
    pub fn into_notification(self, group_id: &str) -> Notification {
        let text = self.to_string();
        match self {
            Rejection::AlreadySignedUp { user_id, .. } | Rejection::OutOfRange { user_id, .. } => {
                Notification::mention(group_id, text, user_id)
            }
            _ => Notification::text(group_id, text),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
