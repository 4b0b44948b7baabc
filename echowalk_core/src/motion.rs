//! Short-horizon motion smoothing and human-shape confirmation per anchor.
//!
//! Two independent detection channels feed the alert engine:
//! - motion: an exponentially smoothed displacement score, sampled once per
//!   tracking tick, flags moving people (human-sized volume) and other
//!   moving objects;
//! - shape: a bounding box with human proportions that persists for the
//!   confirmation window becomes a confirmed human, once per anchor lifetime.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::TrackerCfg;
use crate::geometry::{BoundingBox, Vec3};
use crate::registry::AnchorId;

/// Outcome of the motion channel for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    MovingHuman,
    MovingObject,
}

/// Signals derived for one anchor on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSignal {
    /// Smoothed movement score after this observation.
    pub score: f32,
    pub moving: Option<MotionKind>,
    /// Shape channel: the anchor has been confirmed as a human.
    pub human_confirmed: bool,
    /// Confirmation happened on this observation.
    pub newly_confirmed: bool,
}

#[derive(Debug, Clone)]
struct MotionState {
    last_position: Vec3,
    score: f32,
    /// Cached on first observation and reused afterwards.
    volume: f32,
    human_first_seen: Option<Instant>,
    human_confirmed: bool,
}

/// Volume range (m^3) of something that could be a person.
#[inline]
pub fn is_human_sized(volume: f32) -> bool {
    volume > 0.05 && volume < 2.0
}

/// Standing-person proportions, independent of motion.
pub fn is_human_shape(bbox: &BoundingBox) -> bool {
    let (w, h, d) = (bbox.width(), bbox.height(), bbox.depth());
    h > 1.2 && h < 2.2 && w > 0.25 && w < 1.0 && d > 0.1 && d < 0.5
}

#[derive(Debug)]
pub struct MotionTracker {
    cfg: TrackerCfg,
    confirm_after: Duration,
    states: HashMap<AnchorId, MotionState>,
}

impl MotionTracker {
    pub fn new(cfg: TrackerCfg) -> Self {
        let confirm_after = Duration::from_millis(cfg.human_confirm_ms);
        Self {
            cfg,
            confirm_after,
            states: HashMap::new(),
        }
    }

    pub fn cfg(&self) -> &TrackerCfg {
        &self.cfg
    }

    /// Feed one position sample for `id` and derive this tick's signals.
    ///
    /// `position` is the anchor's world-space center; `bbox` is its current
    /// local bounding box. The volume used for the human-size test is taken
    /// from the first observation only.
    pub fn observe(
        &mut self,
        id: &AnchorId,
        position: Vec3,
        bbox: &BoundingBox,
        now: Instant,
    ) -> MotionSignal {
        let state = self.states.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(anchor = %id, "tracking new anchor");
            MotionState {
                last_position: position,
                score: 0.0,
                volume: bbox.volume(),
                human_first_seen: None,
                human_confirmed: false,
            }
        });

        let displacement = position.distance(state.last_position);
        let displacement = if displacement.is_finite() {
            displacement
        } else {
            0.0
        };
        state.score = state.score * self.cfg.decay + displacement * self.cfg.displacement_gain;
        state.last_position = position;

        let moving = if state.score > self.cfg.human_score && is_human_sized(state.volume) {
            Some(MotionKind::MovingHuman)
        } else if state.score > self.cfg.object_score {
            Some(MotionKind::MovingObject)
        } else {
            None
        };

        let mut newly_confirmed = false;
        if !state.human_confirmed {
            if is_human_shape(bbox) {
                let first = *state.human_first_seen.get_or_insert(now);
                if now.saturating_duration_since(first) >= self.confirm_after {
                    state.human_confirmed = true;
                    newly_confirmed = true;
                    tracing::debug!(anchor = %id, "human shape confirmed");
                }
            } else if state.human_first_seen.take().is_some() {
                tracing::trace!(anchor = %id, "human shape lost before confirmation");
            }
        }

        if let Some(kind) = moving {
            tracing::trace!(anchor = %id, score = state.score, ?kind, "motion");
        }

        MotionSignal {
            score: state.score,
            moving,
            human_confirmed: state.human_confirmed,
            newly_confirmed,
        }
    }

    /// Drop all state for `id`. Returns whether anything was held.
    pub fn forget(&mut self, id: &AnchorId) -> bool {
        self.states.remove(id).is_some()
    }

    /// Keep only anchors for which `live` returns true; returns how many were pruned.
    pub fn retain_live(&mut self, mut live: impl FnMut(&AnchorId) -> bool) -> usize {
        let before = self.states.len();
        self.states.retain(|id, _| live(id));
        before - self.states.len()
    }

    pub fn score(&self, id: &AnchorId) -> Option<f32> {
        self.states.get(id).map(|s| s.score)
    }

    pub fn cached_volume(&self, id: &AnchorId) -> Option<f32> {
        self.states.get(id).map(|s| s.volume)
    }

    pub fn is_confirmed_human(&self, id: &AnchorId) -> bool {
        self.states.get(id).is_some_and(|s| s.human_confirmed)
    }

    pub fn contains(&self, id: &AnchorId) -> bool {
        self.states.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AnchorId> {
        self.states.keys()
    }
}
