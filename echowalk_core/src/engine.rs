//! The obstacle alert engine (`Engine`).
//!
//! Owns the anchor registry, the motion tracker, the alert decision state and
//! the speech queue. Every mutation goes through `&mut self`, so the engine
//! must live on one owner thread; other threads talk to it with `EngineMsg`
//! (see `runner`). Outbound notices accumulate until the owner drains them
//! with `take_notices`.

use std::sync::Arc;
use std::time::Instant;

use echowalk_traits::Synthesizer;
use echowalk_traits::clock::Clock;

use crate::alerts::{Observation, ProximityAlertEngine, Warning};
use crate::config::{EngineSettings, TrackerCfg};
use crate::geometry::Vec3;
use crate::motion::MotionTracker;
use crate::registry::{AnchorRegistry, AnchorSnapshot, GeometryEvent, RegistryChange};
use crate::speech::{SpeechEvent, SpeechNotice, SpeechQueue};

/// Speech request from other subsystems (navigation, UI announcements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechRequest {
    Enqueue(String),
    EnqueueWarning(String),
    ClearAndSpeakNow(String),
    Stop,
}

/// Everything the owner thread accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMsg {
    Geometry(GeometryEvent),
    MotionTick,
    Speech(SpeechEvent),
    Say(SpeechRequest),
    Configure(EngineSettings),
    ObserverMoved(Vec3),
    Shutdown,
}

/// Outbound notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotice {
    /// A warning passed the gate; `accepted` is false when the speech queue
    /// was busy and dropped it.
    Warning { warning: Warning, accepted: bool },
    QueueIdle,
}

pub struct Engine<Y: Synthesizer> {
    pub(crate) registry: AnchorRegistry,
    pub(crate) tracker: MotionTracker,
    pub(crate) alerts: ProximityAlertEngine,
    pub(crate) speech: SpeechQueue<Y>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) settings: EngineSettings,
    pub(crate) observer: Vec3,
    pub(crate) notices: Vec<EngineNotice>,
}

impl<Y: Synthesizer> core::fmt::Debug for Engine<Y> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("anchors", &self.registry.len())
            .field("tracked", &self.tracker.len())
            .field("settings", &self.settings)
            .field("speech", &self.speech)
            .finish()
    }
}

impl<Y: Synthesizer> Engine<Y> {
    #[inline]
    fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn registry(&self) -> &AnchorRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &MotionTracker {
        &self.tracker
    }

    pub fn alerts(&self) -> &ProximityAlertEngine {
        &self.alerts
    }

    pub fn speech(&self) -> &SpeechQueue<Y> {
        &self.speech
    }

    pub fn synthesizer(&self) -> &Y {
        self.speech.synthesizer()
    }

    /// For drivers that simulate the synthesizer's timing themselves.
    pub fn synthesizer_mut(&mut self) -> &mut Y {
        self.speech.synthesizer_mut()
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn tracker_cfg(&self) -> &TrackerCfg {
        self.tracker.cfg()
    }

    pub fn observer(&self) -> Vec3 {
        self.observer
    }

    /// Cloned, read-only view of the live anchors.
    pub fn snapshot(&self) -> Vec<AnchorSnapshot> {
        self.registry.snapshot(self.observer)
    }

    /// Drain notices produced since the last call.
    pub fn take_notices(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Dispatch one message. Returns false once `Shutdown` is seen.
    pub fn handle(&mut self, msg: EngineMsg) -> bool {
        match msg {
            EngineMsg::Geometry(ev) => self.apply_geometry(ev),
            EngineMsg::MotionTick => self.motion_tick(),
            EngineMsg::Speech(ev) => self.on_speech_event(ev),
            EngineMsg::Say(req) => self.say(req),
            EngineMsg::Configure(s) => self.configure(s),
            EngineMsg::ObserverMoved(p) => self.set_observer(p),
            EngineMsg::Shutdown => {
                tracing::info!("engine shutdown requested");
                self.speech.stop();
                return false;
            }
        }
        true
    }

    /// Apply a scan-source event and run the geometry alert path.
    pub fn apply_geometry(&mut self, event: GeometryEvent) {
        match self.registry.apply(event) {
            RegistryChange::Removed(id) => {
                self.tracker.forget(&id);
            }
            RegistryChange::Inserted(id) | RegistryChange::Replaced(id) => {
                let now = self.now();
                let Some(anchor) = self.registry.get(&id) else {
                    return;
                };
                if let Some(w) = self.alerts.on_geometry(anchor, self.observer, now) {
                    self.emit_warning(w);
                }
            }
            RegistryChange::Ignored => {}
        }
    }

    /// One tracking period: prune, observe every anchor, run the motion path.
    pub fn motion_tick(&mut self) {
        let now = self.now();
        let registry = &self.registry;
        let pruned = self.tracker.retain_live(|id| registry.contains(id));
        if pruned > 0 {
            tracing::debug!(pruned, "pruned stale motion state");
        }

        let mut observations = Vec::with_capacity(self.registry.len());
        for anchor in self.registry.iter() {
            let (Some(bbox), Some(center)) = (anchor.bbox(), anchor.world_center()) else {
                continue;
            };
            let signal = self.tracker.observe(anchor.id(), center, bbox, now);
            observations.push(Observation {
                anchor: anchor.id().clone(),
                category: anchor.category(),
                distance_m: center.distance(self.observer),
                volume: anchor.volume(),
                signal,
            });
        }
        for o in observations.iter().filter(|o| o.signal.moving.is_some()) {
            tracing::trace!(
                anchor = %o.anchor,
                category = o.category.name(),
                score = o.signal.score,
                distance_m = o.distance_m,
                "moving anchor"
            );
        }
        tracing::trace!(observed = observations.len(), "motion tick");

        if let Some(w) = self.alerts.on_motion(&observations, now) {
            self.emit_warning(w);
        }
    }

    fn emit_warning(&mut self, warning: Warning) {
        let accepted = self.speech.enqueue_warning(warning.text.clone());
        tracing::info!(
            anchor = %warning.anchor,
            kind = warning.kind.name(),
            distance_cm = warning.distance_cm,
            accepted,
            "{}",
            warning.text
        );
        self.notices.push(EngineNotice::Warning { warning, accepted });
    }

    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        let now = self.now();
        if let Some(n) = self.speech.on_event(event, now) {
            self.push_speech_notice(n);
        }
    }

    pub fn say(&mut self, req: SpeechRequest) {
        match req {
            SpeechRequest::Enqueue(text) => self.speech.enqueue(text),
            SpeechRequest::EnqueueWarning(text) => {
                self.speech.enqueue_warning(text);
            }
            SpeechRequest::ClearAndSpeakNow(text) => self.speech.clear_and_speak_now(text),
            SpeechRequest::Stop => self.speech.stop(),
        }
    }

    pub fn configure(&mut self, settings: EngineSettings) {
        self.alerts.set_enabled(settings.proximity_warnings_enabled);
        if settings.wireframe != self.settings.wireframe {
            self.registry.set_wireframe(settings.wireframe);
        }
        self.settings = settings;
    }

    pub fn set_observer(&mut self, p: Vec3) {
        if p.is_finite() {
            self.observer = p;
        } else {
            tracing::warn!(?p, "non-finite observer position ignored");
        }
    }

    /// Service time-based work (the speech grace deadline).
    pub fn poll(&mut self) {
        let now = self.now();
        if let Some(n) = self.speech.poll(now) {
            self.push_speech_notice(n);
        }
    }

    /// Earliest instant at which `poll` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.speech.next_deadline()
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    fn push_speech_notice(&mut self, n: SpeechNotice) {
        match n {
            SpeechNotice::QueueIdle => self.notices.push(EngineNotice::QueueIdle),
        }
    }
}
