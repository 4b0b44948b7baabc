//! Proximity warning decisions.
//!
//! Two entry points share one cooldown gate and one master toggle:
//! - `on_geometry` runs after an anchor's geometry changes and checks, in
//!   order, the large-obstacle rule and the general proximity rule;
//! - `on_motion` runs on every tracking tick and checks, in order, the
//!   human rule (shape or motion channel) and the moving-object rule.
//!
//! At most one warning is produced per call, and none while the gate is
//! closed. The gate is only consumed when a warning is actually produced.

use std::time::Instant;

use crate::classifier::Category;
use crate::config::AlertCfg;
use crate::cooldown::CooldownGate;
use crate::geometry::Vec3;
use crate::motion::{MotionKind, MotionSignal};
use crate::registry::{Anchor, AnchorId};
use crate::util::truncate_cm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Confirmed human from the shape channel.
    HumanDetected,
    /// Human-sized anchor with a high movement score.
    MovingPerson,
    LargeObstacle,
    Proximity,
    MovingObject,
}

impl WarningKind {
    pub fn name(self) -> &'static str {
        match self {
            WarningKind::HumanDetected => "human_detected",
            WarningKind::MovingPerson => "moving_person",
            WarningKind::LargeObstacle => "large_obstacle",
            WarningKind::Proximity => "proximity",
            WarningKind::MovingObject => "moving_object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    pub anchor: AnchorId,
    pub distance_cm: u32,
    pub text: String,
}

/// Per-anchor input to the motion path for one tick.
#[derive(Debug, Clone)]
pub struct Observation {
    pub anchor: AnchorId,
    pub category: Category,
    pub distance_m: f32,
    pub volume: f32,
    pub signal: MotionSignal,
}

#[derive(Debug)]
pub struct ProximityAlertEngine {
    cfg: AlertCfg,
    gate: CooldownGate,
    enabled: bool,
}

impl ProximityAlertEngine {
    pub fn new(cfg: AlertCfg, enabled: bool) -> Self {
        let gate = CooldownGate::new(cfg.cooldown());
        Self { cfg, gate, enabled }
    }

    pub fn cfg(&self) -> &AlertCfg {
        &self.cfg
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(enabled, "proximity warnings toggled");
        }
        self.enabled = enabled;
    }

    #[inline]
    fn in_range(&self, distance_m: f32, max_m: f32) -> bool {
        distance_m.is_finite() && distance_m >= self.cfg.min_distance_m && distance_m <= max_m
    }

    fn ready(&self, now: Instant) -> bool {
        self.enabled && self.gate.is_open(now)
    }

    fn admit(&mut self, candidate: Option<Warning>, now: Instant) -> Option<Warning> {
        let w = candidate?;
        self.gate.try_consume(now).then_some(w)
    }

    /// Geometry path for one anchor, measured from `observer`.
    pub fn on_geometry(&mut self, anchor: &Anchor, observer: Vec3, now: Instant) -> Option<Warning> {
        if !self.ready(now) {
            return None;
        }
        let candidate = self.geometry_candidate(anchor, observer);
        self.admit(candidate, now)
    }

    fn geometry_candidate(&self, anchor: &Anchor, observer: Vec3) -> Option<Warning> {
        let bbox = anchor.bbox()?;
        if bbox.volume() <= 0.0 {
            return None;
        }
        let distance_m = anchor.distance_from(observer)?;
        let label = anchor.category().label();
        let cm = truncate_cm(distance_m);

        if bbox.frontal_area() > self.cfg.large_obstacle_area_m2
            && self.in_range(distance_m, self.cfg.large_obstacle_max_m)
        {
            return Some(Warning {
                kind: WarningKind::LargeObstacle,
                anchor: anchor.id().clone(),
                distance_cm: cm,
                text: format!("{label} detected {cm} centimeters ahead"),
            });
        }
        if self.in_range(distance_m, self.cfg.proximity_threshold_m)
            && cm <= truncate_cm(self.cfg.proximity_threshold_m)
        {
            return Some(Warning {
                kind: WarningKind::Proximity,
                anchor: anchor.id().clone(),
                distance_cm: cm,
                text: format!("{label} detected approximately {cm} centimeters away"),
            });
        }
        None
    }

    /// Motion path over every tracked anchor for one tick.
    pub fn on_motion(&mut self, observations: &[Observation], now: Instant) -> Option<Warning> {
        if !self.ready(now) {
            return None;
        }
        let candidate = self
            .human_candidate(observations)
            .or_else(|| self.moving_object_candidate(observations));
        self.admit(candidate, now)
    }

    fn nearest<'a>(
        &self,
        observations: &'a [Observation],
        pred: impl Fn(&Observation) -> bool,
    ) -> Option<&'a Observation> {
        observations
            .iter()
            .filter(|o| o.volume > 0.0 && self.in_range(o.distance_m, self.cfg.proximity_threshold_m))
            .filter(|o| pred(o))
            .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
    }

    fn human_candidate(&self, observations: &[Observation]) -> Option<Warning> {
        let o = self.nearest(observations, |o| {
            o.signal.human_confirmed || o.signal.moving == Some(MotionKind::MovingHuman)
        })?;
        let cm = truncate_cm(o.distance_m);
        let (kind, text) = if o.signal.moving == Some(MotionKind::MovingHuman) {
            (
                WarningKind::MovingPerson,
                format!("Moving person detected {cm} centimeters away"),
            )
        } else {
            (WarningKind::HumanDetected, "Human detected nearby".to_string())
        };
        Some(Warning {
            kind,
            anchor: o.anchor.clone(),
            distance_cm: cm,
            text,
        })
    }

    fn moving_object_candidate(&self, observations: &[Observation]) -> Option<Warning> {
        let o = self.nearest(observations, |o| {
            o.signal.moving == Some(MotionKind::MovingObject)
        })?;
        let cm = truncate_cm(o.distance_m);
        Some(Warning {
            kind: WarningKind::MovingObject,
            anchor: o.anchor.clone(),
            distance_cm: cm,
            text: format!("Moving object detected {cm} centimeters away"),
        })
    }
}
