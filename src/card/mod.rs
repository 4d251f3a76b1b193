//! The flip card shell.
//!
//! [`CardView`] holds the open/closed state and routes clicks: the hearts burst
//! emoji into the rain and never flip the card; anything else on the card flips
//! it. `dom` mounts the actual elements and timers.

pub mod dom;

use crate::particles::ParticleField;
use crate::reveal::RevealWatch;
use crate::rng::RandomSource;

/// CSS class marking an activation control inside the card.
pub const HEART_CLASS: &str = "heart-btn";

/// Where a click on the card landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Surface,
    Heart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardReaction {
    Toggled { open: bool },
    Burst { spawned: usize },
}

#[derive(Clone, Debug)]
pub struct CardView {
    open: bool,
    burst_count: usize,
}

impl CardView {
    pub fn new(burst_count: usize) -> Self {
        Self {
            open: false,
            burst_count,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// "Click to open" is only shown on the closed card.
    pub fn shows_open_hint(&self) -> bool {
        !self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn handle_click<R: RandomSource>(
        &mut self,
        target: ClickTarget,
        field: &mut ParticleField<R>,
    ) -> CardReaction {
        match target {
            ClickTarget::Heart => CardReaction::Burst {
                spawned: field.burst(self.burst_count),
            },
            ClickTarget::Surface => CardReaction::Toggled {
                open: self.toggle(),
            },
        }
    }
}

/// The music controls are only mounted once the card has been revealed.
pub fn audio_controls_visible(reveal: &RevealWatch) -> bool {
    reveal.is_revealed()
}

/// Work still owed to the page after a win.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealDuty {
    /// The flip was just observed; send the autoplay signal (exactly once).
    pub autoplay: bool,
    /// Revealed but nothing mounted yet (first reveal, or a failed mount).
    pub mount: bool,
}

/// Consume the watch's pending change and say what is left to do.
pub fn reveal_duty(reveal: &mut RevealWatch, card_mounted: bool) -> RevealDuty {
    RevealDuty {
        autoplay: reveal.changed() == Some(true),
        mount: audio_controls_visible(reveal) && !card_mounted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RainConfig;
    use crate::reveal::GameModeController;
    use crate::rng::Xorshift;

    #[test]
    fn heart_bursts_without_flipping() {
        let mut view = CardView::new(15);
        let mut field = ParticleField::with_rng(RainConfig::default(), Xorshift::seeded(3));
        let r = view.handle_click(ClickTarget::Heart, &mut field);
        assert_eq!(r, CardReaction::Burst { spawned: 15 });
        assert!(!view.is_open());
        assert_eq!(field.len(), 15);
    }

    #[test]
    fn surface_toggles_and_hides_hint() {
        let mut view = CardView::new(15);
        let mut field = ParticleField::with_rng(RainConfig::default(), Xorshift::seeded(3));
        assert!(view.shows_open_hint());
        assert_eq!(
            view.handle_click(ClickTarget::Surface, &mut field),
            CardReaction::Toggled { open: true }
        );
        assert!(!view.shows_open_hint());
        assert_eq!(
            view.handle_click(ClickTarget::Surface, &mut field),
            CardReaction::Toggled { open: false }
        );
        assert!(field.is_empty());
    }

    #[test]
    fn failed_mount_is_retried_without_second_autoplay() {
        let game = GameModeController::new();
        let mut watch = game.watch();
        assert_eq!(
            reveal_duty(&mut watch, false),
            RevealDuty { autoplay: false, mount: false }
        );
        game.declare_win();
        assert_eq!(
            reveal_duty(&mut watch, false),
            RevealDuty { autoplay: true, mount: true }
        );
        // the mount failed: the next call still owes the mount, not the autoplay
        assert_eq!(
            reveal_duty(&mut watch, false),
            RevealDuty { autoplay: false, mount: true }
        );
        assert_eq!(
            reveal_duty(&mut watch, true),
            RevealDuty { autoplay: false, mount: false }
        );
    }
}
