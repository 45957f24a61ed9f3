use tracing::{debug, warn};

use crate::{
    dto::event::{EventOutcome, InboundEvent},
    services::{
        command::{Command, parse_command},
        sse_service,
    },
    state::{
        SharedState,
        game::{GamePhase, Player, parse_guess},
        state_machine::GameEvent,
    },
};

/// Handle one chat message from a group and return what to send back.
///
/// The produced notifications are also broadcast to SSE subscribers.
pub fn handle_event(state: &SharedState, event: InboundEvent) -> EventOutcome {
    let config = state.config();
    if !config.enabled() {
        return EventOutcome::unhandled();
    }

    let group_id = event.group_id.as_str();
    let Some(sender) = event.sender() else {
        warn!(group_id, "inbound event without sender id; skipping");
        return EventOutcome::unhandled();
    };

    let game_event = match parse_command(config.commands(), &event.content) {
        Command::Signup => {
            let nickname = event
                .resolved_nickname()
                .unwrap_or_else(|| sender.to_owned());
            debug!(group_id, user_id = sender, %nickname, "resolved nickname");
            GameEvent::Signup(Player::new(sender, nickname))
        }
        Command::Start => GameEvent::Start,
        Command::End => GameEvent::End,
        Command::Unknown => return EventOutcome::handled(Vec::new()),
        Command::Guess(token) if parse_guess(token).is_some() => {
            if state.games().phase(group_id) != Some(GamePhase::Active) {
                return EventOutcome::unhandled();
            }
            GameEvent::Guess {
                user_id: sender.to_owned(),
                token: token.to_owned(),
            }
        }
        Command::Guess(_) | Command::Ignore => return EventOutcome::unhandled(),
    };

    let notifications = state.games().apply(group_id, game_event);
    sse_service::broadcast_notifications(state, &notifications);
    EventOutcome::handled(notifications)
}
