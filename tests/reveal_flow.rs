// Reveal -> autoplay coordination, wired the way the page wires it:
// the game flips the flag, a watch observes the flip once, and the audio
// controller receives the autoplay signal.

use std::cell::RefCell;
use std::rc::Rc;

use greeting_card::audio::{AudioPlaybackController, EventInbox, MediaEvent, MediaResource, PlayOutcome};
use greeting_card::card::{self, CardReaction, CardView, ClickTarget};
use greeting_card::config::{AudioConfig, CardConfig};
use greeting_card::error::Result;
use greeting_card::particles::ParticleField;
use greeting_card::reveal::{GameMode, GameModeController, RevealWatch};
use greeting_card::rng::Xorshift;

#[derive(Clone, Default)]
struct CountingMedia {
    plays: Rc<RefCell<usize>>,
    inbox: Rc<RefCell<Option<EventInbox>>>,
}

impl MediaResource for CountingMedia {
    fn load(&mut self, _: &AudioConfig, _: bool, inbox: &EventInbox) -> Result<()> {
        *self.inbox.borrow_mut() = Some(inbox.clone());
        Ok(())
    }
    fn start_playback(&mut self) {
        *self.plays.borrow_mut() += 1;
    }
    fn pause(&mut self) {}
    fn set_muted(&mut self, _: bool) {}
    fn release(&mut self) {}
}

// Winning before the music is ready plays it as soon as it is.
#[test]
fn reveal_before_ready_plays_once_ready() {
    let game = GameModeController::new();
    let mut watch = game.watch();
    let media = CountingMedia::default();
    let mut audio = AudioPlaybackController::new(AudioConfig::default());
    audio.initialize(media.clone()).unwrap();

    assert!(!card::audio_controls_visible(&watch));
    assert!(game.declare_win());
    assert_eq!(watch.changed(), Some(true));
    assert!(card::audio_controls_visible(&watch));
    assert_eq!(game.mode(), GameMode::Card);

    assert_eq!(audio.on_autoplay_signal(true), Some(PlayOutcome::Deferred));
    assert!(audio.has_pending_play());

    media.inbox.borrow().as_ref().unwrap().push(MediaEvent::CanPlay);
    audio.pump();
    assert_eq!(*media.plays.borrow(), 1, "deferred autoplay fires with no further calls");
}

// Only the first win flips the flag.
#[test]
fn second_win_changes_nothing() {
    let game = GameModeController::new();
    let mut watch = game.watch();
    assert!(game.declare_win());
    assert_eq!(watch.changed(), Some(true));
    assert!(!game.declare_win());
    assert_eq!(watch.changed(), None);
}

// Heart taps burst, surface clicks flip.
#[test]
fn card_clicks_route_to_burst_or_flip() {
    let cfg = CardConfig::default();
    let mut view = CardView::new(cfg.rain.burst_count);
    let mut field = ParticleField::with_rng(cfg.rain.clone(), Xorshift::seeded(9));

    assert_eq!(
        view.handle_click(ClickTarget::Heart, &mut field),
        CardReaction::Burst { spawned: 15 }
    );
    assert!(!view.is_open(), "heart taps never flip the card");
    assert_eq!(
        view.handle_click(ClickTarget::Surface, &mut field),
        CardReaction::Toggled { open: true }
    );
    view.handle_click(ClickTarget::Heart, &mut field);
    assert!(view.is_open());
    assert_eq!(field.len(), 30);
}

/// One `declare_win` pass as the page runs it; the first mount fails.
fn settle(
    watch: &mut RevealWatch,
    audio: &mut AudioPlaybackController<CountingMedia>,
    mount_attempts: &mut usize,
) {
    let mounted = *mount_attempts > 1;
    let duty = card::reveal_duty(watch, mounted);
    if duty.autoplay {
        audio.on_autoplay_signal(true);
    }
    if duty.mount {
        *mount_attempts += 1;
    }
}

// A failed card mount is retried by the next win call; autoplay fires only once.
#[test]
fn failed_mount_retries_without_replaying_autoplay() {
    let game = GameModeController::new();
    let mut watch = game.watch();
    let media = CountingMedia::default();
    let mut audio = AudioPlaybackController::new(AudioConfig::default());
    audio.initialize(media.clone()).unwrap();
    media.inbox.borrow().as_ref().unwrap().push(MediaEvent::CanPlay);
    audio.pump();
    let mut mount_attempts = 0;

    assert!(game.declare_win());
    settle(&mut watch, &mut audio, &mut mount_attempts);
    assert_eq!(mount_attempts, 1);
    assert_eq!(*media.plays.borrow(), 1, "autoplay armed even though the mount failed");

    assert!(!game.declare_win());
    settle(&mut watch, &mut audio, &mut mount_attempts);
    assert_eq!(mount_attempts, 2, "a later win call retries the mount");
    assert_eq!(*media.plays.borrow(), 1, "the flip drives autoplay once");

    settle(&mut watch, &mut audio, &mut mount_attempts);
    assert_eq!(mount_attempts, 2, "nothing left to do once mounted");
}
