//! `HtmlAudioElement` implementation of [`MediaResource`].
//!
//! The element is created programmatically (no DOM node, no native controls).
//! Its `canplay` / `play` / `pause` / `error` events and the rejection of each
//! `play()` promise are translated into [`MediaEvent`]s; after every push the
//! `notify` hook runs so the owner can pump the controller.

use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlAudioElement};

use super::{EventInbox, MediaEvent, MediaResource, WeakInbox};
use crate::config::AudioConfig;
use crate::error::Result;

type Listener = Closure<dyn FnMut(Event)>;

#[wasm_bindgen]
extern "C" {
    /// Local view of a JS `Promise`, so a method can be bound on it.
    type CatchablePromise;

    /// `Promise.prototype.catch` taking any callable, so a self-freeing
    /// `Closure::once_into_js` handler can be attached.
    #[wasm_bindgen(method, js_name = catch)]
    fn catch_with(this: &CatchablePromise, on_reject: &JsValue) -> Promise;
}

pub struct HtmlAudioResource {
    element: Option<HtmlAudioElement>,
    listeners: Vec<(&'static str, Listener)>,
    inbox: Option<WeakInbox>,
    notify: Rc<dyn Fn()>,
}

impl HtmlAudioResource {
    pub fn new(notify: impl Fn() + 'static) -> Self {
        Self {
            element: None,
            listeners: Vec::new(),
            inbox: None,
            notify: Rc::new(notify),
        }
    }

    pub fn element(&self) -> Option<&HtmlAudioElement> {
        self.element.as_ref()
    }

    fn listen(
        &mut self,
        element: &HtmlAudioElement,
        name: &'static str,
        inbox: &WeakInbox,
        to_event: fn(&HtmlAudioElement) -> MediaEvent,
    ) -> Result<()> {
        let inbox = inbox.clone();
        let notify = self.notify.clone();
        let el = element.clone();
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            if inbox.push(to_event(&el)) {
                notify();
            }
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        self.listeners.push((name, closure));
        Ok(())
    }
}

fn describe_error(el: &HtmlAudioElement) -> MediaEvent {
    let reason = match el.error() {
        Some(err) => format!("media error code {} ({})", err.code(), err.message()),
        None => "unknown media error".to_string(),
    };
    MediaEvent::Error(reason)
}

impl MediaResource for HtmlAudioResource {
    fn load(&mut self, config: &AudioConfig, muted: bool, inbox: &EventInbox) -> Result<()> {
        let element = HtmlAudioElement::new_with_src(&config.src)?;
        element.set_loop(config.looping);
        element.set_preload(&config.preload);
        element.set_cross_origin(Some(&config.cross_origin));
        element.set_volume(config.volume);
        element.set_muted(muted);

        let weak = inbox.downgrade();
        self.listen(&element, "canplay", &weak, |_| MediaEvent::CanPlay)?;
        self.listen(&element, "play", &weak, |_| MediaEvent::Play)?;
        self.listen(&element, "pause", &weak, |_| MediaEvent::Pause)?;
        self.listen(&element, "error", &weak, describe_error)?;

        self.inbox = Some(weak);
        self.element = Some(element);
        Ok(())
    }

    fn start_playback(&mut self) {
        let (Some(element), Some(inbox)) = (self.element.as_ref(), self.inbox.clone()) else {
            return;
        };
        let notify = self.notify.clone();
        match element.play() {
            Ok(promise) => {
                // Success is observed through the `play` event; only rejection matters here.
                let on_reject = Closure::once_into_js(move |err: JsValue| {
                    let reason = err
                        .as_string()
                        .unwrap_or_else(|| format!("{err:?}"));
                    if inbox.push(MediaEvent::PlayRejected(reason)) {
                        notify();
                    }
                });
                let _ = promise.unchecked_ref::<CatchablePromise>().catch_with(&on_reject);
            }
            Err(err) => {
                if inbox.push(MediaEvent::PlayRejected(format!("{err:?}"))) {
                    notify();
                }
            }
        }
    }

    fn pause(&mut self) {
        if let Some(element) = self.element.as_ref() {
            let _ = element.pause();
        }
    }

    fn set_muted(&mut self, muted: bool) {
        if let Some(element) = self.element.as_ref() {
            element.set_muted(muted);
        }
    }

    fn release(&mut self) {
        let Some(element) = self.element.take() else {
            return;
        };
        let _ = element.pause();
        for (name, closure) in self.listeners.drain(..) {
            let _ = element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        self.inbox = None;
    }
}

impl Drop for HtmlAudioResource {
    fn drop(&mut self) {
        self.release();
    }
}
