use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::{notification::Notification, validation::validate_identifier};

/// Chat message forwarded by the bridge for a group conversation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InboundEvent {
    /// Group the message was posted in.
    pub group_id: String,
    /// Author of the message; events without one are skipped.
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Raw text content.
    #[serde(default)]
    pub content: String,
    /// Group-specific display name of the sender.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Nickname as shown in the group, when the platform provides it.
    #[serde(default)]
    pub actual_nickname: Option<String>,
    /// Account nickname of the sender.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl InboundEvent {
    /// Sender id, if present and not blank.
    pub fn sender(&self) -> Option<&str> {
        self.sender_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Best display name for the sender.
    ///
    /// Prefers the display name, then the in-group nickname, then the account
    /// nickname, and finally falls back to the raw sender id.
    pub fn resolved_nickname(&self) -> Option<String> {
        [&self.display_name, &self.actual_nickname, &self.nickname]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .or_else(|| self.sender())
            .map(str::to_owned)
    }

    /// Parse a WebSocket text frame into a validated event.
    pub fn from_json_str(raw: &str) -> Result<Self, InboundEventError> {
        let event: Self = serde_json::from_str(raw)?;
        event.validate()?;
        Ok(event)
    }
}

impl Validate for InboundEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_identifier(&self.group_id) {
            errors.add("group_id", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Failure to decode an inbound frame.
#[derive(Debug, Error)]
pub enum InboundEventError {
    /// Not valid JSON for [`InboundEvent`].
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Well-formed but unusable.
    #[error("invalid event: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventOutcome {
    /// Whether the message was consumed by the game; unhandled messages
    /// should be offered to other handlers.
    pub handled: bool,
    /// Messages to deliver to the group, in order.
    pub notifications: Vec<Notification>,
}

impl EventOutcome {
    /// The event was not meant for the game.
    pub fn unhandled() -> Self {
        Self::default()
    }

    /// The event was consumed and produced `notifications`.
    pub fn handled(notifications: Vec<Notification>) -> Self {
        Self {
            handled: true,
            notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> InboundEvent {
        InboundEvent::from_json_str(json).unwrap()
    }

    #[test]
    fn nickname_priority_is_respected() {
        let e = event(
            r#"{"group_id":"g","sender_id":"u","display_name":"Disp","actual_nickname":"Act","nickname":"Nick"}"#,
        );
        assert_eq!(e.resolved_nickname().as_deref(), Some("Disp"));

        let e = event(r#"{"group_id":"g","sender_id":"u","display_name":"  ","nickname":"Nick"}"#);
        assert_eq!(e.resolved_nickname().as_deref(), Some("Nick"));

        let e = event(r#"{"group_id":"g","sender_id":"u"}"#);
        assert_eq!(e.resolved_nickname().as_deref(), Some("u"));
    }

    #[test]
    fn blank_sender_counts_as_missing() {
        let e = event(r#"{"group_id":"g","sender_id":"  ","content":"hi"}"#);
        assert!(e.sender().is_none());
        assert!(e.resolved_nickname().is_none());
    }

    #[test]
    fn blank_group_is_invalid() {
        let err = InboundEvent::from_json_str(r#"{"group_id":" "}"#).unwrap_err();
        assert!(matches!(err, InboundEventError::Invalid(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = InboundEvent::from_json_str("hello").unwrap_err();
        assert!(matches!(err, InboundEventError::Malformed(_)));
    }
}
