use std::fmt;

use indexmap::IndexMap;

/// Opaque identifier of a chat group hosting a game.
pub type GroupId = String;
/// Opaque identifier of a chat user.
pub type UserId = String;

/// Signed-up players keyed by user id, in signup order.
pub type Roster = IndexMap<UserId, Player>;

/// Player taking part in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identity key of the player on the chat platform.
    pub user_id: UserId,
    /// Display-only name resolved when the player signed up.
    pub nickname: String,
}

impl Player {
    /// Build a player from its identifier and display name.
    pub fn new(user_id: impl Into<UserId>, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
        }
    }
}

/// Inclusive interval of numbers that may still be guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessRange {
    /// Smallest number still allowed.
    pub min: i64,
    /// Largest number still allowed.
    pub max: i64,
}

impl GuessRange {
    /// Build a range from its inclusive bounds.
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the inclusive bounds.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Shrink the range around a guess that missed the bomb.
    ///
    /// The split is strict (`guess ± 1`) so the bomb always stays in range.
    fn narrow(&mut self, guess: i64, bomb_number: i64) {
        if guess < bomb_number {
            self.min = guess + 1;
        } else if guess > bomb_number {
            self.max = guess - 1;
        }
    }
}

impl fmt::Display for GuessRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// Parse a chat token as a guess.
///
/// Full-width digits and signs, as typed through CJK input methods, read as
/// their ASCII counterparts.
pub fn parse_guess(token: &str) -> Option<i64> {
    let normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10).unwrap_or(c),
            '＋' => '+',
            '－' => '-',
            other => other,
        })
        .collect();
    normalized.parse().ok()
}

/// Coarse phase of a group's game, used for logging and health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Signups are open.
    Lobby,
    /// Players are taking turns guessing.
    Active,
}

/// Game hosted by a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Game {
    /// Accepting signups; no bomb has been chosen yet.
    Lobby(Lobby),
    /// Turn-based guessing against a hidden bomb number.
    Active(ActiveGame),
}

impl Game {
    /// Fresh lobby with an empty roster.
    pub fn lobby(range: GuessRange, min_players: usize) -> Self {
        Self::Lobby(Lobby {
            roster: Roster::new(),
            range,
            min_players,
        })
    }

    /// Current phase of the game.
    pub fn phase(&self) -> GamePhase {
        match self {
            Self::Lobby(_) => GamePhase::Lobby,
            Self::Active(_) => GamePhase::Active,
        }
    }

    /// Players that signed up, in signup order.
    pub fn roster(&self) -> &Roster {
        match self {
            Self::Lobby(lobby) => &lobby.roster,
            Self::Active(active) => &active.roster,
        }
    }

    /// Live guessing range (the configured one while in the lobby).
    pub fn range(&self) -> GuessRange {
        match self {
            Self::Lobby(lobby) => lobby.range,
            Self::Active(active) => active.range,
        }
    }
}

/// Lobby phase data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    /// Signed-up players.
    pub roster: Roster,
    /// Range the bomb will be drawn from.
    pub range: GuessRange,
    /// Number of players required before the game can start.
    pub min_players: usize,
}

/// Outcome of an in-range guess applied to an [`ActiveGame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess hit the bomb.
    Boom,
    /// The guess missed; the range shrank and the turn moved on.
    Missed,
}

/// Active phase data. The bomb number and turn order are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGame {
    roster: Roster,
    turn_order: Vec<Player>,
    turn_index: usize,
    bomb_number: i64,
    range: GuessRange,
}

impl ActiveGame {
    /// Start a game from a lobby roster.
    ///
    /// `turn_order` must be a permutation of `roster` and `bomb_number` must lie
    /// within `range`; callers draw both from a [`crate::state::random::RandomSource`].
    pub fn new(roster: Roster, turn_order: Vec<Player>, bomb_number: i64, range: GuessRange) -> Self {
        debug_assert_eq!(roster.len(), turn_order.len());
        debug_assert!(range.contains(bomb_number));
        Self {
            roster,
            turn_order,
            turn_index: 0,
            bomb_number,
            range,
        }
    }

    /// Signed-up players, in signup order.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Fixed cyclic order in which players guess.
    pub fn turn_order(&self) -> &[Player] {
        &self.turn_order
    }

    /// Position of the current player within [`Self::turn_order`].
    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Player expected to guess next.
    pub fn current_player(&self) -> &Player {
        &self.turn_order[self.turn_index]
    }

    /// The hidden target.
    pub fn bomb_number(&self) -> i64 {
        self.bomb_number
    }

    /// Live guessing range.
    pub fn range(&self) -> GuessRange {
        self.range
    }

    /// Apply an in-range guess from the current player.
    pub fn apply_guess(&mut self, guess: i64) -> GuessOutcome {
        debug_assert!(self.range.contains(guess));
        if guess == self.bomb_number {
            return GuessOutcome::Boom;
        }

        self.range.narrow(guess, self.bomb_number);
        self.turn_index = (self.turn_index + 1) % self.turn_order.len();
        GuessOutcome::Missed
    }
}
