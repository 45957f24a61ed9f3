use dashmap::{DashMap, mapref::entry::Entry};

use crate::state::game::{Game, GamePhase, GuessRange};

/// Defaults used to seed a freshly created lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyDefaults {
    /// Initial guessing range.
    pub range: GuessRange,
    /// Players required before the game may start.
    pub min_players: usize,
}

/// What happens to a group's entry after [`GameStateStore::update`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep the (possibly mutated) game.
    Keep,
    /// Drop the game; the group returns to "no game".
    Remove,
}

/// Group-keyed registry of running games.
///
/// Mutations for one group run while that group's map entry is held
/// exclusively, so transitions of a group are serialized while other groups
/// proceed concurrently. Closures passed in must not call back into the store.
#[derive(Debug)]
pub struct GameStateStore {
    games: DashMap<String, Game>,
    defaults: LobbyDefaults,
}

impl GameStateStore {
    /// Create an empty store seeding new lobbies with `defaults`.
    pub fn new(defaults: LobbyDefaults) -> Self {
        Self {
            games: DashMap::new(),
            defaults,
        }
    }

    /// Return the group's game, creating an empty lobby if none exists.
    pub fn get_or_create(&self, group_id: &str) -> Game {
        self.games
            .entry(group_id.to_owned())
            .or_insert_with(|| self.fresh_lobby())
            .clone()
    }

    /// Snapshot of the group's game, if any.
    pub fn get(&self, group_id: &str) -> Option<Game> {
        self.games.get(group_id).map(|entry| entry.value().clone())
    }

    /// Phase of the group's game, read in place without cloning it.
    pub fn phase(&self, group_id: &str) -> Option<GamePhase> {
        self.games.get(group_id).map(|entry| entry.phase())
    }

    /// Delete the group's game. Returns whether a game was present.
    pub fn remove(&self, group_id: &str) -> bool {
        self.games.remove(group_id).is_some()
    }

    /// Whether the group currently hosts a game.
    pub fn contains(&self, group_id: &str) -> bool {
        self.games.contains_key(group_id)
    }

    /// Number of groups with a game.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no group hosts a game.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Mutate an existing game, returning `None` when the group has none.
    pub fn update<T>(
        &self,
        group_id: &str,
        mutate: impl FnOnce(&mut Game) -> (T, Disposition),
    ) -> Option<T> {
        match self.games.entry(group_id.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let (value, disposition) = mutate(occupied.get_mut());
                if disposition == Disposition::Remove {
                    occupied.remove();
                }
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Mutate the group's game, creating an empty lobby first if needed.
    pub fn update_or_create<T>(&self, group_id: &str, mutate: impl FnOnce(&mut Game) -> T) -> T {
        let mut entry = self
            .games
            .entry(group_id.to_owned())
            .or_insert_with(|| self.fresh_lobby());
        mutate(entry.value_mut())
    }

    fn fresh_lobby(&self) -> Game {
        Game::lobby(self.defaults.range, self.defaults.min_players)
    }
}
