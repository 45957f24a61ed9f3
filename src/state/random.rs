//! Injectable randomness used to pick the bomb number and the turn order.

use std::sync::{Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::state::game::{GuessRange, Player};

/// Source of the two random draws a game needs when it starts.
pub trait RandomSource: Send + Sync {
    /// Draw a number uniformly from the inclusive `range`.
    fn bomb_number(&self, range: GuessRange) -> i64;

    /// Shuffle `players` so that every ordering is equally likely.
    fn shuffle(&self, players: &mut [Player]);
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn bomb_number(&self, range: GuessRange) -> i64 {
        rand::rng().random_range(range.min..=range.max)
    }

    fn shuffle(&self, players: &mut [Player]) {
        players.shuffle(&mut rand::rng());
    }
}

/// Reproducible source: the same seed always yields the same games.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn bomb_number(&self, range: GuessRange) -> i64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(range.min..=range.max)
    }

    fn shuffle(&self, players: &mut [Player]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        players.shuffle(&mut *rng);
    }
}

/// Scripted source for tests: fixed bomb, signup order kept or replaced.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FixedRandom {
    pub bomb: i64,
    pub order: Option<Vec<&'static str>>,
}

#[cfg(test)]
impl FixedRandom {
    pub fn bomb(bomb: i64) -> Self {
        Self { bomb, order: None }
    }

    pub fn with_order(mut self, order: &[&'static str]) -> Self {
        self.order = Some(order.to_vec());
        self
    }
}

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn bomb_number(&self, range: GuessRange) -> i64 {
        self.bomb.clamp(range.min, range.max)
    }

    fn shuffle(&self, players: &mut [Player]) {
        if let Some(order) = &self.order {
            players.sort_by_key(|player| {
                order
                    .iter()
                    .position(|id| *id == player.user_id)
                    .unwrap_or(usize::MAX)
            });
        }
    }
}
