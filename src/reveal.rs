//! The reveal flag: has the gating game been won?
//!
//! [`GameModeController`] owns the flag and is the only writer. Readers hold a
//! [`RevealWatch`], which reports the single false -> true transition once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::info;

/// One-shot boolean with a change counter.
#[derive(Debug, Default)]
pub struct RevealFlag {
    revealed: AtomicBool,
    version: AtomicU64,
}

impl RevealFlag {
    pub fn is_revealed(&self) -> bool {
        self.revealed.load(Ordering::Acquire)
    }

    /// Bumped on every successful flip (at most once).
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn flip(&self) -> bool {
        let flipped = self
            .revealed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if flipped {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        flipped
    }
}

/// Observer of a [`RevealFlag`].
#[derive(Clone, Debug)]
pub struct RevealWatch {
    flag: Arc<RevealFlag>,
    seen: u64,
}

impl RevealWatch {
    pub fn is_revealed(&self) -> bool {
        self.flag.is_revealed()
    }

    /// `Some(current value)` if the flag changed since the last call.
    pub fn changed(&mut self) -> Option<bool> {
        let v = self.flag.version();
        if v == self.seen {
            return None;
        }
        self.seen = v;
        Some(self.flag.is_revealed())
    }
}

/// Which top-level view should be mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    Playing,
    Card,
}

#[derive(Debug, Default)]
pub struct GameModeController {
    flag: Arc<RevealFlag>,
}

impl GameModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&self) -> RevealWatch {
        RevealWatch {
            flag: self.flag.clone(),
            seen: self.flag.version(),
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.flag.is_revealed()
    }

    pub fn mode(&self) -> GameMode {
        if self.is_revealed() {
            GameMode::Card
        } else {
            GameMode::Playing
        }
    }

    /// The win condition was met. Flips the flag the first time; later calls
    /// do nothing and return `false`.
    pub fn declare_win(&self) -> bool {
        let flipped = self.flag.flip();
        if flipped {
            info!("game won; revealing card");
        }
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_exactly_once() {
        let game = GameModeController::new();
        assert_eq!(game.mode(), GameMode::Playing);
        assert!(game.declare_win());
        assert!(!game.declare_win());
        assert_eq!(game.mode(), GameMode::Card);
    }

    #[test]
    fn watch_sees_single_transition() {
        let game = GameModeController::new();
        let mut w = game.watch();
        assert_eq!(w.changed(), None);
        game.declare_win();
        game.declare_win();
        assert_eq!(w.changed(), Some(true));
        assert_eq!(w.changed(), None);
        assert!(w.is_revealed());
    }

    #[test]
    fn late_watch_starts_caught_up() {
        let game = GameModeController::new();
        game.declare_win();
        let mut w = game.watch();
        assert_eq!(w.changed(), None);
        assert!(w.is_revealed());
    }
}
