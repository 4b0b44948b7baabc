//! `From` implementations bridging `echowalk_config` types to `echowalk_core` types.

use crate::classifier::Category;
use crate::config::{AlertCfg, EngineSettings, SpeechCfg, TrackerCfg};
use crate::geometry::{BoundingBox, Transform, Vec3};
use crate::registry::{AnchorId, Geometry, GeometryEvent};
use echowalk_config::EventKind;

// ── AlertCfg ─────────────────────────────────────────────────────────────────

impl From<&echowalk_config::Alerts> for AlertCfg {
    fn from(c: &echowalk_config::Alerts) -> Self {
        Self {
            cooldown_ms: c.cooldown_ms,
            proximity_threshold_m: c.proximity_threshold_m,
            min_distance_m: c.min_distance_m,
            large_obstacle_max_m: c.large_obstacle_max_m,
            large_obstacle_area_m2: c.large_obstacle_area_m2,
        }
    }
}

// ── TrackerCfg ───────────────────────────────────────────────────────────────

impl From<&echowalk_config::Tracker> for TrackerCfg {
    fn from(c: &echowalk_config::Tracker) -> Self {
        Self {
            tick_ms: c.tick_ms,
            wake_ms: c.wake_ms,
            decay: c.decay,
            displacement_gain: c.displacement_gain,
            human_score: c.human_score,
            object_score: c.object_score,
            human_confirm_ms: c.human_confirm_ms,
        }
    }
}

// ── SpeechCfg ────────────────────────────────────────────────────────────────

impl From<&echowalk_config::Speech> for SpeechCfg {
    fn from(c: &echowalk_config::Speech) -> Self {
        Self {
            grace_ms: c.grace_ms,
        }
    }
}

// ── EngineSettings ───────────────────────────────────────────────────────────

impl From<&echowalk_config::Config> for EngineSettings {
    fn from(c: &echowalk_config::Config) -> Self {
        Self {
            proximity_warnings_enabled: c.alerts.proximity_warnings_enabled,
            wireframe: c.display.wireframe,
        }
    }
}

// ── GeometryEvent ────────────────────────────────────────────────────────────

/// Scenario rows carry an untyped surface label; unknown labels are dropped
/// so that geometry decides.
impl From<&echowalk_config::ScenarioEvent> for GeometryEvent {
    fn from(ev: &echowalk_config::ScenarioEvent) -> Self {
        let id = AnchorId::from(ev.anchor_id.as_str());
        let geometry = || Geometry {
            bbox: ev
                .bbox
                .map(|(min, max)| BoundingBox::new(Vec3::from(min), Vec3::from(max))),
            transform: ev
                .translation
                .map(|t| Transform::from_translation(Vec3::from(t))),
            surface: ev.surface.as_deref().and_then(Category::from_surface),
        };
        match ev.kind {
            EventKind::Added => GeometryEvent::Added(id, geometry()),
            EventKind::Updated => GeometryEvent::Updated(id, geometry()),
            EventKind::Removed => GeometryEvent::Removed(id),
        }
    }
}
