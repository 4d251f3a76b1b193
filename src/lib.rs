//! Greeting card core crate.
//!
//! A mini game (hosted by the page, outside this crate) gates a flip card with
//! a handwritten message. Once the game reports a win through `declare_win()`
//! the card is mounted with its emoji rain, and background music is armed for
//! autoplay. The rain ([`particles`]) and the music state machine ([`audio`])
//! are plain Rust and test natively; `card::dom` and `audio::html` are the
//! browser glue.

use std::cell::RefCell;

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::window;

pub mod audio;
pub mod card;
pub mod config;
pub mod error;
pub mod logging;
pub mod particles;
pub mod reveal;
pub mod rng;
pub mod schedule;

use audio::AudioPlaybackController;
use audio::html::HtmlAudioResource;
use card::dom::{CardDom, ControlsDom, RainTimers};
use card::{CardView, ClickTarget};
use config::CardConfig;
use error::CardError;
use particles::ParticleField;
use reveal::{GameModeController, RevealWatch};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Page-wide state
// -----------------------------------------------------------------------------

/// The card once revealed. Field order is drop order: timers stop first.
struct MountedCard {
    _timers: RainTimers,
    view: CardView,
    field: ParticleField,
    dom: CardDom,
    controls: ControlsDom,
}

struct App {
    config: CardConfig,
    game: GameModeController,
    reveal: RevealWatch,
    audio: AudioPlaybackController<HtmlAudioResource>,
    card: Option<MountedCard>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Run `f` against the app if it is started and not already borrowed.
fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => None,
    })
}

/// Media events land in the controller's inbox; this drains it. If the app
/// is busy the events stay queued and the next `sync` picks them up.
fn pump_audio() {
    with_app(App::sync);
}

impl App {
    fn new(config: CardConfig) -> Self {
        let game = GameModeController::new();
        let reveal = game.watch();
        let audio = AudioPlaybackController::new(config.audio.clone());
        Self {
            config,
            game,
            reveal,
            audio,
            card: None,
        }
    }

    /// Drain media events and refresh the music controls.
    fn sync(&mut self) {
        self.audio.pump();
        if let Some(card) = self.card.as_ref() {
            if let Err(err) = card
                .controls
                .render(self.audio.is_playing(), self.audio.is_muted())
            {
                warn!("controls render failed: {err}");
            }
        }
    }

    /// Carry out whatever the reveal still owes: arm autoplay on the flip,
    /// then mount the card. A failed mount is retried on the next call.
    fn settle_reveal(&mut self) -> Result<(), CardError> {
        let duty = card::reveal_duty(&mut self.reveal, self.card.is_some());
        if duty.autoplay {
            self.audio.on_autoplay_signal(true);
        }
        if duty.mount {
            self.mount_card()?;
        }
        self.sync();
        Ok(())
    }

    fn mount_card(&mut self) -> Result<(), CardError> {
        let win = window().ok_or(CardError::NoWindow)?;
        let doc = win.document().ok_or(CardError::NoDocument)?;
        let rain = self.config.rain.clone();

        let dom = CardDom::mount(&doc, &self.config.message, on_card_click)?;
        let controls = ControlsDom::mount(
            &doc,
            |_| {
                with_app(|app| {
                    app.audio.toggle_play();
                    app.sync();
                });
            },
            |_| {
                with_app(|app| {
                    app.audio.toggle_mute();
                    app.sync();
                });
            },
        )?;
        let timers = RainTimers::start(
            &win,
            rain.spawn_period_ms,
            rain.advance_period_ms,
            || {
                with_app(|app| {
                    if let Some(card) = app.card.as_mut() {
                        card.field.spawn_one();
                    }
                });
            },
            || {
                with_app(|app| {
                    if let Some(card) = app.card.as_mut() {
                        card.field.tick();
                        card.dom.render_rain(card.field.particles());
                    }
                });
            },
        )?;

        let view = CardView::new(rain.burst_count);
        dom.render_card(&view)?;
        self.card = Some(MountedCard {
            _timers: timers,
            view,
            field: ParticleField::new(rain),
            dom,
            controls,
        });
        Ok(())
    }
}

fn on_card_click(target: ClickTarget) {
    with_app(|app| {
        if let Some(card) = app.card.as_mut() {
            card.view.handle_click(target, &mut card.field);
            if let Err(err) = card.dom.render_card(&card.view) {
                warn!("card render failed: {err}");
            }
            card.dom.render_rain(card.field.particles());
        }
    });
}

fn start_with(config: CardConfig) -> Result<(), CardError> {
    config.validate()?;
    if let Err(err) = logging::init_logging(&config.log_level) {
        web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
    }
    // a restart replaces the previous app (and its media element) wholesale
    teardown();

    let mut app = App::new(config);
    if let Err(err) = app.audio.initialize(HtmlAudioResource::new(pump_audio)) {
        // the card still works, just silently
        warn!("audio unavailable: {err}");
    }
    APP.with(|cell| cell.replace(Some(app)));
    Ok(())
}

// -----------------------------------------------------------------------------
// JS entry points
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_card() -> Result<(), JsValue> {
    start_with(CardConfig::default()).map_err(Into::into)
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_card_with_config(json: &str) -> Result<(), JsValue> {
    let config = CardConfig::from_json(json)?;
    start_with(config).map_err(Into::into)
}

/// Called by the gating game when it is won. Returns `true` on the first call.
/// If mounting the card failed earlier, calling again retries the mount.
#[wasm_bindgen]
pub fn declare_win() -> Result<bool, JsValue> {
    let outcome = with_app(|app| -> Result<bool, CardError> {
        let flipped = app.game.declare_win();
        app.settle_reveal()?;
        Ok(flipped)
    });
    match outcome {
        Some(result) => result.map_err(Into::into),
        None => Err(CardError::NotStarted.into()),
    }
}

#[wasm_bindgen]
pub fn toggle_play() {
    with_app(|app| {
        app.audio.toggle_play();
        app.sync();
    });
}

/// Returns the new muted value, or `false` if the card is not started.
#[wasm_bindgen]
pub fn toggle_mute() -> bool {
    with_app(|app| {
        let muted = app.audio.toggle_mute();
        app.sync();
        muted
    })
    .unwrap_or(false)
}

/// `"not-ready" | "ready-idle" | "ready-playing"`, or `"stopped"`.
#[wasm_bindgen]
pub fn audio_state() -> String {
    with_app(|app| app.audio.state().as_str().to_string()).unwrap_or_else(|| "stopped".into())
}

#[wasm_bindgen]
pub fn audio_muted() -> bool {
    with_app(|app| app.audio.is_muted()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn game_mode() -> String {
    with_app(|app| match app.game.mode() {
        reveal::GameMode::Playing => "game".to_string(),
        reveal::GameMode::Card => "card".to_string(),
    })
    .unwrap_or_else(|| "stopped".into())
}

/// Live particles as a JSON array (empty before the card is revealed).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn particles_json() -> Result<String, JsValue> {
    let json = with_app(|app| match app.card.as_ref() {
        Some(card) => serde_json::to_string(card.field.particles()),
        None => Ok("[]".to_string()),
    })
    .unwrap_or_else(|| Ok("[]".to_string()));
    json.map_err(|err| CardError::from(err).into())
}

/// Cancel the rain timers, unmount the card and release the audio element.
#[wasm_bindgen]
pub fn teardown() {
    let old = APP.with(|cell| cell.borrow_mut().take());
    drop(old);
}
