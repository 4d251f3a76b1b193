//! DOM side of the card: elements, click listeners, rain timers, rendering.
//!
//! Everything mounted here is owned by a value with a `Drop` that undoes it,
//! so tearing the card down is just dropping [`CardDom`], [`ControlsDom`] and
//! [`RainTimers`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent, Window};

use super::{CardView, ClickTarget, HEART_CLASS};
use crate::error::{CardError, Result};
use crate::particles::Particle;

type ClickListener = Closure<dyn FnMut(MouseEvent)>;

struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: ClickListener,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        name: &'static str,
        handler: impl FnMut(MouseEvent) + 'static,
    ) -> Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            name,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
    }
}

fn create(doc: &Document, tag: &str, id: Option<&str>, style: &str) -> Result<HtmlElement> {
    let el: HtmlElement = doc
        .create_element(tag)?
        .dyn_into()
        .map_err(|_| CardError::Dom(format!("<{tag}> is not an HtmlElement")))?;
    if let Some(id) = id {
        el.set_id(id);
    }
    el.set_attribute("style", style)?;
    Ok(el)
}

/// True if the click landed on (or inside) a heart.
fn click_hits_heart(evt: &MouseEvent) -> bool {
    evt.target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(&format!(".{HEART_CLASS}")).ok().flatten())
        .is_some()
}

const CARD_STYLE: &str = "position:relative; width:320px; height:384px; cursor:pointer; \
transform-style:preserve-3d; transition:transform 0.7s ease-out; border-radius:8px; \
box-shadow:0 0 32px 0 rgba(0,0,0,0.18); background:#fdf8f0; border:2px solid #e8dccb;";

const HEART_STYLE: &str = "cursor:pointer; user-select:none; display:inline-block;";

pub struct CardDom {
    root: HtmlElement,
    card: HtmlElement,
    front: HtmlElement,
    back: HtmlElement,
    hint: HtmlElement,
    rain: HtmlElement,
    _listeners: Vec<Listener>,
}

impl CardDom {
    /// Build the card under `body`. `on_click` receives the routed target of
    /// every click on the card; heart clicks never reach the surface handler.
    pub fn mount(
        doc: &Document,
        message: &str,
        on_click: impl Fn(ClickTarget) + Clone + 'static,
    ) -> Result<Self> {
        let body = doc.body().ok_or(CardError::NoDocument)?;

        let root = create(
            doc,
            "div",
            Some("gc-root"),
            "position:fixed; inset:0; display:flex; align-items:center; justify-content:center; perspective:1000px;",
        )?;
        let card = create(doc, "div", Some("gc-card"), CARD_STYLE)?;

        let front = create(
            doc,
            "div",
            Some("gc-card-front"),
            "position:absolute; inset:0; display:flex; align-items:center; justify-content:center; backface-visibility:hidden;",
        )?;
        let big_heart = create(doc, "span", None, &format!("{HEART_STYLE} font-size:96px;"))?;
        big_heart.set_class_name(HEART_CLASS);
        big_heart.set_text_content(Some("♡"));
        front.append_child(&big_heart)?;

        let back = create(
            doc,
            "div",
            Some("gc-card-back"),
            "position:absolute; inset:0; padding:32px; display:flex; flex-direction:column; align-items:center; justify-content:center; backface-visibility:hidden; transform:rotateY(180deg);",
        )?;
        let text = create(
            doc,
            "p",
            None,
            "white-space:pre-line; text-align:center; font-size:20px; line-height:1.6; font-family:'Caveat', cursive;",
        )?;
        text.set_text_content(Some(message));
        back.append_child(&text)?;
        let small_heart = create(doc, "span", None, &format!("{HEART_STYLE} font-size:32px; opacity:0.6;"))?;
        small_heart.set_class_name(HEART_CLASS);
        small_heart.set_text_content(Some("❤"));
        back.append_child(&small_heart)?;

        card.append_child(&front)?;
        card.append_child(&back)?;
        root.append_child(&card)?;

        let hint = create(
            doc,
            "p",
            Some("gc-hint"),
            "position:absolute; bottom:48px; width:100%; text-align:center; opacity:0.6; font-size:14px;",
        )?;
        hint.set_text_content(Some("Click to open"));
        root.append_child(&hint)?;

        let rain = create(
            doc,
            "div",
            Some("gc-rain"),
            "position:fixed; inset:0; pointer-events:none; z-index:50; overflow:hidden;",
        )?;
        body.append_child(&root)?;
        body.append_child(&rain)?;

        let mut listeners = Vec::with_capacity(3);
        for heart in [&big_heart, &small_heart] {
            let on_click = on_click.clone();
            listeners.push(Listener::attach(heart, "click", move |evt: MouseEvent| {
                // keep the heart tap away from the card flip
                evt.stop_propagation();
                on_click(ClickTarget::Heart);
            })?);
        }
        listeners.push(Listener::attach(&card, "click", move |evt: MouseEvent| {
            if click_hits_heart(&evt) {
                return;
            }
            on_click(ClickTarget::Surface);
        })?);

        Ok(Self {
            root,
            card,
            front,
            back,
            hint,
            rain,
            _listeners: listeners,
        })
    }

    pub fn render_card(&self, view: &CardView) -> Result<()> {
        let (transform, scale) = if view.is_open() {
            ("rotateY(-180deg)", "scale(1.1)")
        } else {
            ("rotateY(0deg)", "scale(1)")
        };
        self.card
            .set_attribute("style", &format!("{CARD_STYLE} transform:{scale} {transform};"))?;
        self.front
            .set_attribute("aria-hidden", if view.is_open() { "true" } else { "false" })?;
        self.back
            .set_attribute("aria-hidden", if view.is_open() { "false" } else { "true" })?;
        let display = if view.shows_open_hint() { "block" } else { "none" };
        self.hint.set_attribute(
            "style",
            &format!(
                "position:absolute; bottom:48px; width:100%; text-align:center; opacity:0.6; font-size:14px; display:{display};"
            ),
        )?;
        Ok(())
    }

    pub fn render_rain(&self, particles: &[Particle]) {
        let mut html = String::with_capacity(particles.len() * 96);
        for p in particles {
            html.push_str(&format!(
                "<div style='position:absolute; font-size:36px; left:{:.2}%; top:{:.2}%; transform:rotate({:.1}deg);'>{}</div>",
                p.x(),
                p.y(),
                p.rotation(),
                p.glyph().as_str()
            ));
        }
        self.rain.set_inner_html(&html);
    }
}

impl Drop for CardDom {
    fn drop(&mut self) {
        self.root.remove();
        self.rain.remove();
    }
}

/// Music control panel (play/pause + mute), top right.
pub struct ControlsDom {
    panel: HtmlElement,
    play: HtmlElement,
    mute: HtmlElement,
    _listeners: Vec<Listener>,
}

impl ControlsDom {
    pub fn mount(
        doc: &Document,
        on_play: impl FnMut(MouseEvent) + 'static,
        on_mute: impl FnMut(MouseEvent) + 'static,
    ) -> Result<Self> {
        let body = doc.body().ok_or(CardError::NoDocument)?;
        let panel = create(
            doc,
            "div",
            Some("gc-audio-controls"),
            "position:fixed; top:16px; right:16px; z-index:60; display:flex; gap:8px; padding:8px; border-radius:9999px; background:rgba(255,255,255,0.9);",
        )?;
        panel.set_attribute("role", "region")?;
        panel.set_attribute("aria-label", "Background music controls")?;

        let button_style = "border:none; border-radius:9999px; padding:12px; cursor:pointer; font-size:18px;";
        let play = create(doc, "button", Some("gc-play"), button_style)?;
        let mute = create(doc, "button", Some("gc-mute"), button_style)?;
        panel.append_child(&play)?;
        panel.append_child(&mute)?;
        body.append_child(&panel)?;

        let listeners = vec![
            Listener::attach(&play, "click", on_play)?,
            Listener::attach(&mute, "click", on_mute)?,
        ];
        let controls = Self {
            panel,
            play,
            mute,
            _listeners: listeners,
        };
        controls.render(false, false)?;
        Ok(controls)
    }

    pub fn render(&self, playing: bool, muted: bool) -> Result<()> {
        let play_label = if playing { "Pause music" } else { "Play music" };
        self.play.set_text_content(Some(if playing { "⏸" } else { "▶" }));
        self.play
            .set_attribute("aria-pressed", if playing { "true" } else { "false" })?;
        self.play.set_attribute("aria-label", play_label)?;
        self.play.set_attribute("title", play_label)?;

        let mute_label = if muted { "Unmute music" } else { "Mute music" };
        self.mute.set_text_content(Some(if muted { "🔇" } else { "🔊" }));
        self.mute
            .set_attribute("aria-pressed", if muted { "true" } else { "false" })?;
        self.mute.set_attribute("aria-label", mute_label)?;
        self.mute.set_attribute("title", mute_label)?;
        // dimmed while nothing is playing
        let opacity = if playing { "1" } else { "0.75" };
        self.mute.set_attribute(
            "style",
            &format!(
                "border:none; border-radius:9999px; padding:12px; cursor:pointer; font-size:18px; opacity:{opacity};"
            ),
        )?;
        Ok(())
    }
}

impl Drop for ControlsDom {
    fn drop(&mut self) {
        self.panel.remove();
    }
}

/// A `setInterval` timer, cleared on drop.
pub struct Interval {
    window: Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start(window: &Window, period_ms: u32, callback: impl FnMut() + 'static) -> Result<Self> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        let timeout = i32::try_from(period_ms).unwrap_or(i32::MAX);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout,
        )?;
        Ok(Self {
            window: window.clone(),
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
    }
}

/// The ambient spawn and advance schedules. Dropping it cancels both.
pub struct RainTimers {
    _spawn: Interval,
    _advance: Interval,
}

impl RainTimers {
    pub fn start(
        window: &Window,
        spawn_period_ms: u32,
        advance_period_ms: u32,
        on_spawn: impl FnMut() + 'static,
        on_advance: impl FnMut() + 'static,
    ) -> Result<Self> {
        let spawn = Interval::start(window, spawn_period_ms, on_spawn)?;
        let advance = Interval::start(window, advance_period_ms, on_advance)?;
        Ok(Self {
            _spawn: spawn,
            _advance: advance,
        })
    }
}
