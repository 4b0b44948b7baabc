//! Configuration types for the alert engine.
//!
//! These are the runtime configuration structs used by `Engine`.
//! They are separate from the TOML-deserialized config in `echowalk_config`.

use std::time::Duration;

/// Alert decision thresholds.
#[derive(Debug, Clone)]
pub struct AlertCfg {
    /// Global minimum spacing between spoken warnings, in ms. Default: 3000.
    pub cooldown_ms: u64,
    /// General proximity radius in metres. Default: 2.0.
    pub proximity_threshold_m: f32,
    /// Distances below this are ignored as noise. Default: 0.1.
    pub min_distance_m: f32,
    /// Upper radius for the large-obstacle warning. Default: 1.5.
    pub large_obstacle_max_m: f32,
    /// Frontal area (width * height) above which an obstacle is large. Default: 1.0.
    pub large_obstacle_area_m2: f32,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            proximity_threshold_m: 2.0,
            min_distance_m: 0.1,
            large_obstacle_max_m: 1.5,
            large_obstacle_area_m2: 1.0,
        }
    }
}

impl AlertCfg {
    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Motion tracking parameters.
#[derive(Debug, Clone)]
pub struct TrackerCfg {
    /// Tracking period in ms. Default: 500.
    pub tick_ms: u64,
    /// Wake interval of the tick loop in ms. Default: 100.
    pub wake_ms: u64,
    /// Score decay per tick. Default: 0.8.
    pub decay: f32,
    /// Score gained per metre moved. Default: 5.0.
    pub displacement_gain: f32,
    /// Moving-person threshold for human-sized anchors. Default: 1.0.
    pub human_score: f32,
    /// Moving-object threshold. Default: 2.0.
    pub object_score: f32,
    /// Human-shape confirmation window in ms. Default: 1000.
    pub human_confirm_ms: u64,
}

impl Default for TrackerCfg {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            wake_ms: 100,
            decay: 0.8,
            displacement_gain: 5.0,
            human_score: 1.0,
            object_score: 2.0,
            human_confirm_ms: 1000,
        }
    }
}

/// Speech queue pacing.
#[derive(Debug, Clone)]
pub struct SpeechCfg {
    /// Pause after a finished utterance before starting the next, in ms. Default: 300.
    pub grace_ms: u64,
}

impl Default for SpeechCfg {
    fn default() -> Self {
        Self { grace_ms: 300 }
    }
}

/// User-facing toggles pushed into the engine by the surrounding app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub proximity_warnings_enabled: bool,
    /// Display-only; forwarded to anchor display styles.
    pub wireframe: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            proximity_warnings_enabled: true,
            wireframe: false,
        }
    }
}
