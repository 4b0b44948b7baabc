//! Type-state builder for `Engine`.
//!
//! The builder enforces at compile time that a synthesizer is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use echowalk_traits::Synthesizer;
use echowalk_traits::clock::{Clock, MonotonicClock};

use crate::alerts::ProximityAlertEngine;
use crate::config::{AlertCfg, EngineSettings, SpeechCfg, TrackerCfg};
use crate::engine::Engine;
use crate::error::{BuildError, Result};
use crate::geometry::Vec3;
use crate::motion::MotionTracker;
use crate::registry::AnchorRegistry;
use crate::speech::SpeechQueue;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

impl<Y: Synthesizer> Engine<Y> {
    /// Start building an Engine.
    pub fn builder() -> EngineBuilder<Y, Missing> {
        EngineBuilder::default()
    }
}

/// Builder for `Engine`. All fields are validated on `build()`.
pub struct EngineBuilder<Y, S> {
    synth: Option<Y>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    alerts: Option<AlertCfg>,
    tracker: Option<TrackerCfg>,
    speech: Option<SpeechCfg>,
    settings: Option<EngineSettings>,
    observer: Option<Vec3>,
    _s: PhantomData<S>,
}

impl<Y> Default for EngineBuilder<Y, Missing> {
    fn default() -> Self {
        Self {
            synth: None,
            clock: None,
            alerts: None,
            tracker: None,
            speech: None,
            settings: None,
            observer: None,
            _s: PhantomData,
        }
    }
}

const MAX_HUMAN_CONFIRM_MS: u64 = 60 * 1000;

fn validate(alerts: &AlertCfg, tracker: &TrackerCfg) -> std::result::Result<(), BuildError> {
    if alerts.cooldown_ms == 0 {
        return Err(BuildError::InvalidConfig("cooldown_ms must be >= 1"));
    }
    let radii = [
        alerts.proximity_threshold_m,
        alerts.min_distance_m,
        alerts.large_obstacle_max_m,
        alerts.large_obstacle_area_m2,
    ];
    if radii.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return Err(BuildError::InvalidConfig(
            "alert distances must be finite and non-negative",
        ));
    }
    if alerts.min_distance_m >= alerts.proximity_threshold_m {
        return Err(BuildError::InvalidConfig(
            "min_distance_m must be below proximity_threshold_m",
        ));
    }
    if !(alerts.large_obstacle_max_m > alerts.min_distance_m
        && alerts.large_obstacle_max_m <= alerts.proximity_threshold_m)
    {
        return Err(BuildError::InvalidConfig(
            "large_obstacle_max_m must be in (min_distance_m, proximity_threshold_m]",
        ));
    }
    if tracker.tick_ms == 0 || tracker.wake_ms == 0 {
        return Err(BuildError::InvalidConfig("tick_ms and wake_ms must be >= 1"));
    }
    if tracker.wake_ms > tracker.tick_ms {
        return Err(BuildError::InvalidConfig("wake_ms must be <= tick_ms"));
    }
    if !(0.0..1.0).contains(&tracker.decay) {
        return Err(BuildError::InvalidConfig("decay must be in [0.0, 1.0)"));
    }
    if !(tracker.displacement_gain.is_finite() && tracker.displacement_gain > 0.0) {
        return Err(BuildError::InvalidConfig("displacement_gain must be > 0"));
    }
    if !(tracker.human_score > 0.0 && tracker.human_score <= tracker.object_score) {
        return Err(BuildError::InvalidConfig(
            "human_score must be > 0 and <= object_score",
        ));
    }
    if !(1..=MAX_HUMAN_CONFIRM_MS).contains(&tracker.human_confirm_ms) {
        return Err(BuildError::InvalidConfig(
            "human_confirm_ms must be in [1, 60000]",
        ));
    }
    Ok(())
}

impl<Y: Synthesizer, S> EngineBuilder<Y, S> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Engine<Y>> {
        let synth = self
            .synth
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSynthesizer))?;
        let alerts = self.alerts.unwrap_or_default();
        let tracker = self.tracker.unwrap_or_default();
        let speech = self.speech.unwrap_or_default();
        let settings = self.settings.unwrap_or_default();
        validate(&alerts, &tracker).map_err(eyre::Report::new)?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let observer = self.observer.unwrap_or(Vec3::ZERO);
        if !observer.is_finite() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "observer position must be finite",
            )));
        }

        Ok(Engine {
            registry: AnchorRegistry::new(settings.wireframe),
            tracker: MotionTracker::new(tracker),
            alerts: ProximityAlertEngine::new(alerts, settings.proximity_warnings_enabled),
            speech: SpeechQueue::new(synth, Duration::from_millis(speech.grace_ms)),
            clock,
            settings,
            observer,
            notices: Vec::new(),
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<Y, S> EngineBuilder<Y, S> {
    pub fn with_alerts(mut self, alerts: AlertCfg) -> Self {
        self.alerts = Some(alerts);
        self
    }
    pub fn with_tracker(mut self, tracker: TrackerCfg) -> Self {
        self.tracker = Some(tracker);
        self
    }
    pub fn with_speech(mut self, speech: SpeechCfg) -> Self {
        self.speech = Some(speech);
        self
    }
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }
    pub fn with_observer(mut self, observer: Vec3) -> Self {
        self.observer = Some(observer);
        self
    }
    /// Apply every table of a loaded config file.
    pub fn with_config(self, cfg: &echowalk_config::Config) -> Self {
        self.with_alerts(AlertCfg::from(&cfg.alerts))
            .with_tracker(TrackerCfg::from(&cfg.tracker))
            .with_speech(SpeechCfg::from(&cfg.speech))
            .with_settings(EngineSettings::from(cfg))
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setter that advances type-state
impl<Y> EngineBuilder<Y, Missing> {
    pub fn with_synthesizer(self, synth: Y) -> EngineBuilder<Y, Set> {
        EngineBuilder {
            synth: Some(synth),
            clock: self.clock,
            alerts: self.alerts,
            tracker: self.tracker,
            speech: self.speech,
            settings: self.settings,
            observer: self.observer,
            _s: PhantomData,
        }
    }
}

impl<Y: Synthesizer> EngineBuilder<Y, Set> {
    /// Build with all required fields present.
    pub fn build(self) -> Result<Engine<Y>> {
        self.try_build()
    }
}
