use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::{CommandSet, GameSettings},
    dto::notification::Notification,
    error::Rejection,
    state::{
        game::{ActiveGame, Game, GamePhase, GuessOutcome, Lobby, Player, UserId, parse_guess},
        random::RandomSource,
        store::{Disposition, GameStateStore},
    },
};

const SEPARATOR: &str = "--------------------";

/// Events that can be applied to a group's game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A player asks to join the lobby.
    Signup(Player),
    /// Someone asks to start the game.
    Start,
    /// Someone asks to end the game.
    End,
    /// A player sent a candidate guess.
    Guess {
        /// Sender of the message.
        user_id: UserId,
        /// Raw message token; non-numeric tokens are ignored.
        token: String,
    },
}

/// Per-group digital bomb state machine.
///
/// Owns the [`GameStateStore`]; every event for a group is applied while that
/// group's entry is locked, and produces the notifications to send back.
pub struct GameStateMachine {
    store: GameStateStore,
    commands: CommandSet,
    random: Arc<dyn RandomSource>,
}

impl GameStateMachine {
    /// Build a state machine with an empty store.
    pub fn new(settings: &GameSettings, commands: CommandSet, random: Arc<dyn RandomSource>) -> Self {
        Self {
            store: GameStateStore::new(settings.lobby_defaults()),
            commands,
            random,
        }
    }

    /// Registry of running games.
    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    /// Phase of the group's game, `None` when it has none.
    pub fn phase(&self, group_id: &str) -> Option<GamePhase> {
        self.store.phase(group_id)
    }

    /// Apply `event` to the group's game and return the messages to deliver.
    ///
    /// Ignored events (out-of-turn or non-numeric guesses, ending a missing
    /// game) yield no notification.
    pub fn apply(&self, group_id: &str, event: GameEvent) -> Vec<Notification> {
        let result = match event {
            GameEvent::Signup(player) => self.signup(group_id, player),
            GameEvent::Start => self.start(group_id),
            GameEvent::End => Ok(self.end(group_id)),
            GameEvent::Guess { user_id, token } => self.guess(group_id, &user_id, &token),
        };

        match result {
            Ok(notification) => notification.into_iter().collect(),
            Err(rejection) => {
                debug!(group_id, %rejection, "event rejected");
                vec![rejection.into_notification(group_id)]
            }
        }
    }

    fn signup(&self, group_id: &str, player: Player) -> Result<Option<Notification>, Rejection> {
        self.store.update_or_create(group_id, |game| {
            let Game::Lobby(lobby) = game else {
                return Err(Rejection::SignupClosed);
            };

            if lobby.roster.contains_key(&player.user_id) {
                return Err(Rejection::AlreadySignedUp {
                    user_id: player.user_id,
                    nickname: player.nickname,
                });
            }

            lobby.roster.insert(player.user_id.clone(), player.clone());
            let registered = lobby.roster.len();
            info!(group_id, user_id = %player.user_id, registered, "player signed up");

            let text = format!(
                "{} signed up!\nPlayers registered: {registered}\nSend \"{}\" to begin!",
                player.nickname,
                self.commands.start_hint()
            );
            Ok(Some(Notification::mention(group_id, text, player.user_id)))
        })
    }

    fn start(&self, group_id: &str) -> Result<Option<Notification>, Rejection> {
        self.store
            .update(group_id, |game| {
                let active = match game {
                    Game::Active(_) => return (Err(Rejection::AlreadyStarted), Disposition::Keep),
                    Game::Lobby(lobby) => match self.begin(lobby) {
                        Ok(active) => active,
                        Err(rejection) => return (Err(rejection), Disposition::Keep),
                    },
                };

                info!(
                    group_id,
                    players = active.turn_order().len(),
                    bomb = active.bomb_number(),
                    "game started"
                );
                let notification = start_announcement(group_id, &active);
                *game = Game::Active(active);
                (Ok(Some(notification)), Disposition::Keep)
            })
            .unwrap_or(Err(Rejection::NoPlayers))
    }

    /// Draw the bomb and the turn order for a lobby that is ready to play.
    fn begin(&self, lobby: &Lobby) -> Result<ActiveGame, Rejection> {
        if lobby.roster.is_empty() {
            return Err(Rejection::NoPlayers);
        }
        if lobby.roster.len() < lobby.min_players {
            return Err(Rejection::NotEnoughPlayers {
                required: lobby.min_players,
                registered: lobby.roster.len(),
            });
        }

        let bomb_number = self.random.bomb_number(lobby.range);
        let mut turn_order: Vec<Player> = lobby.roster.values().cloned().collect();
        self.random.shuffle(&mut turn_order);

        Ok(ActiveGame::new(
            lobby.roster.clone(),
            turn_order,
            bomb_number,
            lobby.range,
        ))
    }

    fn end(&self, group_id: &str) -> Option<Notification> {
        if !self.store.remove(group_id) {
            debug!(group_id, "end requested without a game");
            return None;
        }

        info!(group_id, "game ended manually");
        Some(Notification::text(
            group_id,
            "The game has been ended by a player.",
        ))
    }

    fn guess(
        &self,
        group_id: &str,
        user_id: &str,
        token: &str,
    ) -> Result<Option<Notification>, Rejection> {
        self.store
            .update(group_id, |game| {
                let Game::Active(active) = game else {
                    return (Ok(None), Disposition::Keep);
                };

                let current = active.current_player().clone();
                if current.user_id != user_id {
                    debug!(group_id, user_id, "ignoring out-of-turn message");
                    return (Ok(None), Disposition::Keep);
                }

                let Some(guess) = parse_guess(token) else {
                    return (Ok(None), Disposition::Keep);
                };

                let range = active.range();
                if !range.contains(guess) {
                    return (
                        Err(Rejection::OutOfRange {
                            user_id: current.user_id,
                            nickname: current.nickname,
                            min: range.min,
                            max: range.max,
                        }),
                        Disposition::Keep,
                    );
                }

                match active.apply_guess(guess) {
                    GuessOutcome::Boom => {
                        info!(group_id, user_id, bomb = guess, "bomb hit; game over");
                        let text = format!(
                            "BOOM! 💥 The bomb was {guess}!\n{SEPARATOR}\nStepped on it: {}\n{SEPARATOR}\nGame over!",
                            current.nickname
                        );
                        (
                            Ok(Some(Notification::mention(group_id, text, current.user_id))),
                            Disposition::Remove,
                        )
                    }
                    GuessOutcome::Missed => {
                        let next = active.current_player();
                        let text = format!(
                            "{} guessed {guess}.\nNew range: {}\n{SEPARATOR}\n{}, your turn to guess!",
                            current.nickname,
                            active.range(),
                            next.nickname
                        );
                        (
                            Ok(Some(Notification::mention(group_id, text, next.user_id.clone()))),
                            Disposition::Keep,
                        )
                    }
                }
            })
            .unwrap_or(Ok(None))
    }
}

fn start_announcement(group_id: &str, active: &ActiveGame) -> Notification {
    let order = active
        .turn_order()
        .iter()
        .map(|player| player.nickname.as_str())
        .collect::<Vec<_>>()
        .join(" -> ");
    let first = active.current_player();
    let text = format!(
        "💣 Digital bomb started! 💣\n{SEPARATOR}\nTurn order: {order}\nRange: {}\n{SEPARATOR}\n{}, you go first!",
        active.range(),
        first.nickname
    );
    Notification::mention(group_id, text, first.user_id.clone())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, thread};

    use super::*;
    use crate::state::{game::GuessRange, random::FixedRandom};

    const GROUP: &str = "group@chatroom";

    fn machine(min_players: usize, range: GuessRange, random: FixedRandom) -> GameStateMachine {
        let settings = GameSettings {
            min_players,
            range,
            seed: None,
        };
        GameStateMachine::new(&settings, CommandSet::default(), Arc::new(random))
    }

    fn signup(sm: &GameStateMachine, id: &str) -> Vec<Notification> {
        sm.apply(GROUP, GameEvent::Signup(Player::new(id, id.to_uppercase())))
    }

    fn guess(sm: &GameStateMachine, id: &str, token: &str) -> Vec<Notification> {
        sm.apply(
            GROUP,
            GameEvent::Guess {
                user_id: id.into(),
                token: token.into(),
            },
        )
    }

    fn active(sm: &GameStateMachine) -> ActiveGame {
        match sm.store().get(GROUP) {
            Some(Game::Active(active)) => active,
            other => panic!("expected active game, got {other:?}"),
        }
    }

    #[test]
    fn signup_creates_lobby_and_counts_players() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        assert!(sm.store().get(GROUP).is_none());

        let out = signup(&sm, "a");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mentions(), ["a".to_string()]);
        assert!(out[0].body().contains("Players registered: 1"));
        assert!(out[0].body().contains("bomb start"));

        let out = signup(&sm, "b");
        assert!(out[0].body().contains("Players registered: 2"));

        let game = sm.store().get(GROUP).unwrap();
        assert_eq!(game.phase(), GamePhase::Lobby);
        let ids: Vec<_> = game.roster().keys().cloned().collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn duplicate_signup_is_rejected_with_mention() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");

        let out = signup(&sm, "a");
        assert_eq!(out, [Notification::mention(GROUP, "A, you have already signed up!", "a")]);
        assert_eq!(sm.store().get(GROUP).unwrap().roster().len(), 1);
    }

    #[test]
    fn signup_after_start_is_rejected() {
        let sm = machine(1, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        sm.apply(GROUP, GameEvent::Start);

        let out = signup(&sm, "b");
        assert_eq!(
            out,
            [Notification::text(GROUP, Rejection::SignupClosed.to_string())]
        );
        assert_eq!(active(&sm).roster().len(), 1);
    }

    #[test]
    fn start_without_game_is_rejected_and_creates_nothing() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        let out = sm.apply(GROUP, GameEvent::Start);
        assert_eq!(out, [Notification::text(GROUP, Rejection::NoPlayers.to_string())]);
        assert!(sm.store().is_empty());
    }

    #[test]
    fn start_on_empty_lobby_is_rejected() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        sm.store().get_or_create(GROUP);
        let out = sm.apply(GROUP, GameEvent::Start);
        assert_eq!(out[0].body(), Rejection::NoPlayers.to_string());
    }

    #[test]
    fn start_with_too_few_players_stays_in_lobby() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");

        let out = sm.apply(GROUP, GameEvent::Start);
        assert_eq!(
            out[0].body(),
            "Not enough players: at least 2 are needed to start the game!"
        );
        assert_eq!(sm.phase(GROUP), Some(GamePhase::Lobby));
    }

    #[test]
    fn start_transitions_once() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7).with_order(&["b", "a"]));
        signup(&sm, "a");
        signup(&sm, "b");

        let out = sm.apply(GROUP, GameEvent::Start);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mentions(), ["b".to_string()]);
        assert!(out[0].body().contains("Turn order: B -> A"));
        assert!(out[0].body().contains("Range: 1 - 10"));

        let game = active(&sm);
        assert_eq!(game.bomb_number(), 7);
        assert_eq!(game.turn_index(), 0);
        assert_eq!(game.turn_order().len(), 2);

        let out = sm.apply(GROUP, GameEvent::Start);
        assert_eq!(out[0].body(), Rejection::AlreadyStarted.to_string());
        assert_eq!(active(&sm), game);
    }

    #[test]
    fn two_player_scenario_ends_with_boom() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        signup(&sm, "b");
        sm.apply(GROUP, GameEvent::Start);

        let out = guess(&sm, "a", "5");
        assert_eq!(out[0].mentions(), ["b".to_string()]);
        assert!(out[0].body().contains("A guessed 5."));
        assert!(out[0].body().contains("New range: 6 - 10"));
        let game = active(&sm);
        assert_eq!(game.range(), GuessRange::new(6, 10));
        assert_eq!(game.current_player().user_id, "b");

        let out = guess(&sm, "b", "9");
        assert!(out[0].body().contains("New range: 6 - 8"));
        let game = active(&sm);
        assert_eq!(game.range(), GuessRange::new(6, 8));
        assert_eq!(game.current_player().user_id, "a");

        let out = guess(&sm, "a", "7");
        assert_eq!(out[0].mentions(), ["a".to_string()]);
        assert!(out[0].body().starts_with("BOOM! 💥 The bomb was 7!"));
        assert!(out[0].body().contains("Stepped on it: A"));
        assert!(sm.store().get(GROUP).is_none());
    }

    #[test]
    fn full_width_guess_narrows_the_range() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7).with_order(&["a", "b"]));
        signup(&sm, "a");
        signup(&sm, "b");
        sm.apply(GROUP, GameEvent::Start);

        let out = guess(&sm, "a", "５");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mentions(), ["b".to_string()]);
        assert!(out[0].body().contains("A guessed 5."));
        assert!(out[0].body().contains("New range: 6 - 10"));

        let game = active(&sm);
        assert_eq!(game.range(), GuessRange::new(6, 10));
        assert_eq!(game.current_player().user_id, "b");

        let out = guess(&sm, "b", "１１");
        assert_eq!(out[0].body(), "B, the number must be between 6 and 10!");
    }

    #[test]
    fn out_of_turn_guess_is_ignored() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        signup(&sm, "b");
        sm.apply(GROUP, GameEvent::Start);
        let before = active(&sm);

        assert!(guess(&sm, "c", "7").is_empty());
        assert!(guess(&sm, "b", "7").is_empty());
        assert_eq!(active(&sm), before);
    }

    #[test]
    fn non_numeric_guess_is_ignored() {
        let sm = machine(1, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        sm.apply(GROUP, GameEvent::Start);
        let before = active(&sm);

        assert!(guess(&sm, "a", "seven").is_empty());
        assert!(guess(&sm, "a", "7.5").is_empty());
        assert_eq!(active(&sm), before);
    }

    #[test]
    fn out_of_range_guess_mentions_bounds_without_advancing() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        signup(&sm, "b");
        sm.apply(GROUP, GameEvent::Start);
        guess(&sm, "a", "5");

        let out = guess(&sm, "b", "3");
        assert_eq!(
            out,
            [Notification::mention(
                GROUP,
                "B, the number must be between 6 and 10!",
                "b"
            )]
        );
        let game = active(&sm);
        assert_eq!(game.current_player().user_id, "b");
        assert_eq!(game.range(), GuessRange::new(6, 10));
    }

    #[test]
    fn guess_without_active_game_is_ignored() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        assert!(guess(&sm, "a", "7").is_empty());
        signup(&sm, "a");
        assert!(guess(&sm, "a", "7").is_empty());
        assert_eq!(sm.phase(GROUP), Some(GamePhase::Lobby));
    }

    #[test]
    fn single_player_turn_stays_with_them() {
        let sm = machine(1, GuessRange::new(1, 3), FixedRandom::bomb(2));
        signup(&sm, "a");
        sm.apply(GROUP, GameEvent::Start);

        let out = guess(&sm, "a", "3");
        assert_eq!(out[0].mentions(), ["a".to_string()]);
        assert_eq!(active(&sm).range(), GuessRange::new(1, 2));
        assert_eq!(active(&sm).turn_index(), 0);
    }

    #[test]
    fn turn_index_advances_by_one_per_miss() {
        let sm = machine(3, GuessRange::new(1, 100), FixedRandom::bomb(100));
        for id in ["a", "b", "c"] {
            signup(&sm, id);
        }
        sm.apply(GROUP, GameEvent::Start);

        for step in 0..7 {
            let game = active(&sm);
            assert_eq!(game.turn_index(), step % 3);
            let player = game.current_player().user_id.clone();
            guess(&sm, &player, &game.range().min.to_string());
            let after = active(&sm);
            assert!(after.range().contains(after.bomb_number()));
        }
    }

    #[test]
    fn concurrent_signups_register_each_player_once() {
        const PLAYERS: usize = 64;
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));

        let replies: Vec<(Vec<Notification>, Vec<Notification>)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..PLAYERS)
                .map(|k| {
                    let sm = &sm;
                    scope.spawn(move || {
                        let id = format!("u{k}");
                        (signup(sm, &id), signup(sm, &id))
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        let mut counts: Vec<usize> = replies
            .iter()
            .map(|(first, second)| {
                assert!(second[0].body().ends_with("you have already signed up!"));
                first[0]
                    .body()
                    .lines()
                    .find_map(|line| line.strip_prefix("Players registered: "))
                    .and_then(|count| count.parse().ok())
                    .expect("accepted signup reports the roster size")
            })
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=PLAYERS).collect::<Vec<_>>());

        let game = sm.store().get(GROUP).unwrap();
        assert_eq!(game.roster().len(), PLAYERS);
        let ids: HashSet<_> = game.roster().values().map(|player| &player.user_id).collect();
        assert_eq!(ids.len(), PLAYERS);
    }

    #[test]
    fn concurrent_guesses_advance_the_turn_once_per_accepted_guess() {
        const PLAYERS: usize = 8;
        const TURNS: usize = 5;
        let sm = machine(1, GuessRange::new(1, 1000), FixedRandom::bomb(1000));
        for k in 0..PLAYERS {
            signup(&sm, &format!("p{k}"));
        }
        sm.apply(GROUP, GameEvent::Start);

        let replies: Vec<Notification> = thread::scope(|scope| {
            let handles: Vec<_> = (0..PLAYERS)
                .map(|k| {
                    let sm = &sm;
                    scope.spawn(move || {
                        let id = format!("p{k}");
                        let mut replies = Vec::new();
                        while replies.len() < TURNS {
                            let game = active(sm);
                            if game.current_player().user_id == id {
                                replies.extend(guess(sm, &id, &game.range().min.to_string()));
                            } else {
                                // Either out of turn or below the live range once play has moved.
                                guess(sm, &id, "1");
                                thread::yield_now();
                            }
                        }
                        replies
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let accepted = replies
            .iter()
            .filter(|reply| reply.body().contains(" guessed "))
            .count();
        assert_eq!(accepted, PLAYERS * TURNS);
        assert_eq!(replies.len(), accepted);

        let game = active(&sm);
        assert_eq!(game.turn_index(), accepted % PLAYERS);
        assert_eq!(game.range(), GuessRange::new(1 + accepted as i64, 1000));
    }

    #[test]
    fn end_removes_game_and_second_end_is_silent() {
        let sm = machine(2, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");

        let out = sm.apply(GROUP, GameEvent::End);
        assert_eq!(
            out,
            [Notification::text(GROUP, "The game has been ended by a player.")]
        );
        assert!(sm.store().get(GROUP).is_none());

        assert!(sm.apply(GROUP, GameEvent::End).is_empty());
    }

    #[test]
    fn end_stops_an_active_game() {
        let sm = machine(1, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        sm.apply(GROUP, GameEvent::Start);
        sm.apply(GROUP, GameEvent::End);
        assert_eq!(sm.phase(GROUP), None);
        assert!(guess(&sm, "a", "7").is_empty());
    }

    #[test]
    fn groups_do_not_share_games() {
        let sm = machine(1, GuessRange::new(1, 10), FixedRandom::bomb(7));
        signup(&sm, "a");
        sm.apply(GROUP, GameEvent::Start);
        sm.apply("other", GameEvent::Signup(Player::new("a", "A")));

        assert_eq!(sm.phase(GROUP), Some(GamePhase::Active));
        assert_eq!(sm.phase("other"), Some(GamePhase::Lobby));
    }
}
