//! Background music controller.
//!
//! [`AudioPlaybackController`] is a small state machine over one media
//! resource. The resource reports what actually happened (ready, playing,
//! paused, failed, play rejected) by pushing [`MediaEvent`]s into a shared
//! [`EventInbox`]; the controller consumes them one at a time in
//! [`AudioPlaybackController::pump`]. Requests (`request_play`, `request_pause`)
//! only ever *ask* the resource; `playing` changes only when the resource's own
//! events say so.
//!
//! Known race: a pause requested while a play attempt is still pending is a
//! no-op (nothing is playing yet), so the later `Play` event wins. The final
//! state always matches the last event the resource emitted.

pub mod html;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};

use crate::config::AudioConfig;
use crate::error::{CardError, Result};

/// Something the media resource reports back.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    /// Enough data buffered to start playback (`canplay`).
    CanPlay,
    Play,
    Pause,
    /// Load / decode failure.
    Error(String),
    /// A play attempt was refused (autoplay policy, interrupted, ...).
    PlayRejected(String),
}

/// Serial queue of media events, shared between a resource and its controller.
#[derive(Clone, Default)]
pub struct EventInbox {
    queue: Rc<RefCell<VecDeque<MediaEvent>>>,
}

impl EventInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: MediaEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn pop(&self) -> Option<MediaEvent> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Handle for callbacks that may outlive the controller.
    pub fn downgrade(&self) -> WeakInbox {
        WeakInbox {
            queue: Rc::downgrade(&self.queue),
        }
    }
}

/// Weak side of an [`EventInbox`]; pushes are dropped once the inbox is gone.
#[derive(Clone)]
pub struct WeakInbox {
    queue: Weak<RefCell<VecDeque<MediaEvent>>>,
}

impl WeakInbox {
    /// Returns `false` when the owning controller has been torn down.
    pub fn push(&self, event: MediaEvent) -> bool {
        match self.queue.upgrade() {
            Some(q) => {
                q.borrow_mut().push_back(event);
                true
            }
            None => false,
        }
    }
}

/// The platform side of playback. Implementations report outcomes through the
/// inbox handed to [`MediaResource::load`]; none of these calls block.
pub trait MediaResource {
    /// Acquire the media, start loading and attach event listeners.
    fn load(&mut self, config: &AudioConfig, muted: bool, inbox: &EventInbox) -> Result<()>;
    /// Fire-and-forget play attempt.
    fn start_playback(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    /// Stop playback and detach every listener.
    fn release(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
}

/// Play/pause axis of the controller. Mute is tracked separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    NotReady,
    ReadyIdle,
    ReadyPlaying,
}

impl PlaybackState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::NotReady => "not-ready",
            PlaybackState::ReadyIdle => "ready-idle",
            PlaybackState::ReadyPlaying => "ready-playing",
        }
    }
}

/// What a play request turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Resource was ready; a play attempt is in flight.
    Attempted,
    /// Not ready yet; the intent is queued for the readiness signal.
    Deferred,
    AlreadyPlaying,
}

pub struct AudioPlaybackController<M: MediaResource> {
    config: AudioConfig,
    resource: Option<M>,
    inbox: EventInbox,
    readiness: Readiness,
    playing: bool,
    muted: bool,
    pending_play: bool,
    load_failed: bool,
}

impl<M: MediaResource> AudioPlaybackController<M> {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            resource: None,
            inbox: EventInbox::new(),
            readiness: Readiness::NotReady,
            playing: false,
            muted: false,
            pending_play: false,
            load_failed: false,
        }
    }

    /// Take ownership of `resource` and start loading it. Only once per controller.
    pub fn initialize(&mut self, mut resource: M) -> Result<()> {
        if self.resource.is_some() {
            warn!("audio: initialize called twice; ignoring second resource");
            return Err(CardError::AlreadyInitialized);
        }
        resource.load(&self.config, self.muted, &self.inbox)?;
        debug!("audio: loading {}", self.config.src);
        self.resource = Some(resource);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.resource.is_some()
    }

    pub fn inbox(&self) -> &EventInbox {
        &self.inbox
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn has_pending_play(&self) -> bool {
        self.pending_play
    }

    /// True once a load error was seen before readiness; the controller stays inert.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn state(&self) -> PlaybackState {
        match (self.readiness, self.playing) {
            (Readiness::NotReady, _) => PlaybackState::NotReady,
            (Readiness::Ready, false) => PlaybackState::ReadyIdle,
            (Readiness::Ready, true) => PlaybackState::ReadyPlaying,
        }
    }

    /// Ask for playback. Deferred until readiness if the resource is not ready
    /// (or not even initialized).
    pub fn request_play(&mut self) -> PlayOutcome {
        if self.playing {
            return PlayOutcome::AlreadyPlaying;
        }
        match (self.readiness, self.resource.as_mut()) {
            (Readiness::Ready, Some(resource)) => {
                resource.start_playback();
                PlayOutcome::Attempted
            }
            _ => {
                debug!("audio: not ready, deferring play intent");
                self.pending_play = true;
                PlayOutcome::Deferred
            }
        }
    }

    /// Stop playback if something is playing; otherwise nothing happens.
    pub fn request_pause(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
        }
    }

    /// Play/pause toggle as wired to the control button.
    pub fn toggle_play(&mut self) -> Option<PlayOutcome> {
        if self.playing {
            self.request_pause();
            None
        } else {
            Some(self.request_play())
        }
    }

    /// Flip mute. Never touches `playing`. Returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if let Some(resource) = self.resource.as_mut() {
            resource.set_muted(self.muted);
        }
        self.muted
    }

    /// Reveal-driven autoplay. Same as `request_play` when `active` and idle.
    pub fn on_autoplay_signal(&mut self, active: bool) -> Option<PlayOutcome> {
        if !active || self.playing {
            return None;
        }
        Some(self.request_play())
    }

    /// Feed one event and process everything queued.
    pub fn dispatch(&mut self, event: MediaEvent) {
        self.inbox.push(event);
        self.pump();
    }

    /// Consume queued media events in arrival order. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.inbox.pop() {
            self.apply(event);
            handled += 1;
        }
        handled
    }

    fn apply(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::CanPlay => {
                if self.readiness == Readiness::Ready || self.load_failed {
                    return;
                }
                self.readiness = Readiness::Ready;
                info!("audio: ready");
                if self.pending_play {
                    self.pending_play = false;
                    if let Some(resource) = self.resource.as_mut() {
                        debug!("audio: honoring deferred play intent");
                        resource.start_playback();
                    }
                }
            }
            MediaEvent::Play => self.playing = true,
            MediaEvent::Pause => self.playing = false,
            MediaEvent::Error(reason) => {
                warn!("audio: media error: {reason}");
                if self.readiness == Readiness::NotReady {
                    self.load_failed = true;
                    self.pending_play = false;
                }
            }
            MediaEvent::PlayRejected(reason) => {
                warn!("audio: playback failed: {reason}");
                self.playing = false;
            }
        }
    }

    /// Stop the resource, detach its listeners and drop queued events.
    pub fn teardown(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.release();
        }
        self.inbox.clear();
        self.playing = false;
        self.pending_play = false;
    }
}

impl<M: MediaResource> Drop for AudioPlaybackController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
