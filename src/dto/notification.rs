use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outbound message the chat bridge must deliver to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Plain text addressed to the whole group.
    Text {
        /// Target group.
        group_id: String,
        /// Message body.
        text: String,
    },
    /// Text addressed to the group that highlights specific users.
    Mention {
        /// Target group.
        group_id: String,
        /// Message body.
        text: String,
        /// Users to at-mention.
        mentions: Vec<String>,
    },
}

impl Notification {
    /// Plain group message.
    pub fn text(group_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            group_id: group_id.into(),
            text: text.into(),
        }
    }

    /// Group message mentioning a single user.
    pub fn mention(
        group_id: impl Into<String>,
        text: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::Mention {
            group_id: group_id.into(),
            text: text.into(),
            mentions: vec![user_id.into()],
        }
    }

    /// Target group of the message.
    pub fn group_id(&self) -> &str {
        match self {
            Self::Text { group_id, .. } | Self::Mention { group_id, .. } => group_id,
        }
    }

    /// Message body.
    pub fn body(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Mention { text, .. } => text,
        }
    }

    /// Users highlighted by the message (empty for plain text).
    pub fn mentions(&self) -> &[String] {
        match self {
            Self::Text { .. } => &[],
            Self::Mention { mentions, .. } => mentions,
        }
    }
}
