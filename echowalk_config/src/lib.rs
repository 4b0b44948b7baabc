#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and scenario parsing for the obstacle alert engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The scenario CSV loader enforces headers and turns each row into a
//!   recorded geometry event that the CLI can replay.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Alerts {
    /// Master toggle for spoken obstacle warnings.
    pub proximity_warnings_enabled: bool,
    /// Global minimum spacing between two spoken warnings (ms).
    pub cooldown_ms: u64,
    /// General proximity radius (m) for "approximately N centimeters away".
    pub proximity_threshold_m: f32,
    /// Anything closer than this (m) is treated as sensor noise.
    pub min_distance_m: f32,
    /// Upper radius (m) for the large-obstacle "ahead" warning.
    pub large_obstacle_max_m: f32,
    /// Frontal area (width * height, m^2) above which an obstacle is "large".
    pub large_obstacle_area_m2: f32,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            proximity_warnings_enabled: true,
            cooldown_ms: 3000,
            proximity_threshold_m: 2.0,
            min_distance_m: 0.1,
            large_obstacle_max_m: 1.5,
            large_obstacle_area_m2: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Tracker {
    /// Motion tracking period (ms).
    pub tick_ms: u64,
    /// Wake interval of the cooperative tick loop (ms); shutdown is observed this often.
    pub wake_ms: u64,
    /// Per-tick decay of the movement score, in [0, 1).
    pub decay: f32,
    /// Score gained per metre of displacement.
    pub displacement_gain: f32,
    /// Score above which a human-sized anchor is a moving person.
    pub human_score: f32,
    /// Score above which any other anchor is a moving object.
    pub object_score: f32,
    /// How long a human-shaped box must persist before it is confirmed (ms).
    pub human_confirm_ms: u64,
}

impl Default for Tracker {
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Speech {
    /// Pause after a finished utterance before the next one starts (ms).
    pub grace_ms: u64,
}

impl Default for Speech {
    fn default() -> Self {
        Self { grace_ms: 300 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Display {
    /// Render anchors as wireframes; display-only, never read by alert logic.
    pub wireframe: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub alerts: Alerts,
    pub tracker: Tracker,
    pub speech: Speech,
    pub display: Display,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Alerts
        let a = &self.alerts;
        if a.cooldown_ms == 0 {
            eyre::bail!("alerts.cooldown_ms must be >= 1");
        }
        if !(a.min_distance_m.is_finite() && a.min_distance_m >= 0.0) {
            eyre::bail!("alerts.min_distance_m must be >= 0");
        }
        if !(a.proximity_threshold_m.is_finite() && a.proximity_threshold_m > 0.0) {
            eyre::bail!("alerts.proximity_threshold_m must be > 0");
        }
        if a.min_distance_m >= a.proximity_threshold_m {
            eyre::bail!("alerts.min_distance_m must be < alerts.proximity_threshold_m");
        }
        if !(a.large_obstacle_max_m > a.min_distance_m
            && a.large_obstacle_max_m <= a.proximity_threshold_m)
        {
            eyre::bail!(
                "alerts.large_obstacle_max_m must be in (min_distance_m, proximity_threshold_m]"
            );
        }
        if !(a.large_obstacle_area_m2.is_finite() && a.large_obstacle_area_m2 > 0.0) {
            eyre::bail!("alerts.large_obstacle_area_m2 must be > 0");
        }

        // Tracker
        let t = &self.tracker;
        if t.tick_ms == 0 {
            eyre::bail!("tracker.tick_ms must be >= 1");
        }
        if t.wake_ms == 0 {
            eyre::bail!("tracker.wake_ms must be >= 1");
        }
        if t.wake_ms > t.tick_ms {
            eyre::bail!("tracker.wake_ms must be <= tracker.tick_ms");
        }
        if !(t.decay >= 0.0 && t.decay < 1.0) {
            eyre::bail!("tracker.decay must be in [0.0, 1.0)");
        }
        if !(t.displacement_gain.is_finite() && t.displacement_gain > 0.0) {
            eyre::bail!("tracker.displacement_gain must be > 0");
        }
        if !(t.human_score.is_finite() && t.human_score > 0.0) {
            eyre::bail!("tracker.human_score must be > 0");
        }
        if !(t.object_score.is_finite() && t.object_score > 0.0) {
            eyre::bail!("tracker.object_score must be > 0");
        }
        if t.human_score > t.object_score {
            eyre::bail!("tracker.human_score must be <= tracker.object_score");
        }
        if t.human_confirm_ms == 0 {
            eyre::bail!("tracker.human_confirm_ms must be >= 1");
        }
        if t.human_confirm_ms > 60 * 1000 {
            eyre::bail!("tracker.human_confirm_ms is unreasonably large (>1min)");
        }

        // Speech
        if self.speech.grace_ms > 10 * 1000 {
            eyre::bail!("speech.grace_ms is unreasonably large (>10s)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// Kind of a recorded geometry event.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Added,
    Updated,
    Removed,
}

/// Scenario CSV schema.
///
/// Expected headers:
/// t_ms,kind,anchor_id,min_x,min_y,min_z,max_x,max_y,max_z,tx,ty,tz,surface
///
/// Bounding-box cells are either all present or all empty; the same holds
/// for the translation cells. `surface` is an optional source-side label.
///
/// Example:
/// t_ms,kind,anchor_id,min_x,min_y,min_z,max_x,max_y,max_z,tx,ty,tz,surface
/// 0,added,wall-1,-1.1,0,-0.15,1.1,2.1,0.15,0,0,-0.8,
/// 4000,removed,wall-1,,,,,,,,,,
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioRow {
    pub t_ms: u64,
    pub kind: EventKind,
    pub anchor_id: String,
    pub min_x: Option<f32>,
    pub min_y: Option<f32>,
    pub min_z: Option<f32>,
    pub max_x: Option<f32>,
    pub max_y: Option<f32>,
    pub max_z: Option<f32>,
    pub tx: Option<f32>,
    pub ty: Option<f32>,
    pub tz: Option<f32>,
    #[serde(default)]
    pub surface: Option<String>,
}

/// One validated scenario event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEvent {
    pub t_ms: u64,
    pub kind: EventKind,
    pub anchor_id: String,
    /// (min, max) corners in anchor-local space.
    pub bbox: Option<([f32; 3], [f32; 3])>,
    /// World-space translation of the anchor.
    pub translation: Option<[f32; 3]>,
    pub surface: Option<String>,
}

fn all_or_none(cells: [Option<f32>; 3]) -> Option<Option<[f32; 3]>> {
    match cells {
        [Some(x), Some(y), Some(z)] => Some(Some([x, y, z])),
        [None, None, None] => Some(None),
        _ => None,
    }
}

impl TryFrom<ScenarioRow> for ScenarioEvent {
    type Error = eyre::Report;

    fn try_from(r: ScenarioRow) -> Result<Self, Self::Error> {
        if r.anchor_id.trim().is_empty() {
            eyre::bail!("anchor_id must not be empty");
        }
        let min = all_or_none([r.min_x, r.min_y, r.min_z])
            .ok_or_else(|| eyre::eyre!("min_x/min_y/min_z must be all set or all empty"))?;
        let max = all_or_none([r.max_x, r.max_y, r.max_z])
            .ok_or_else(|| eyre::eyre!("max_x/max_y/max_z must be all set or all empty"))?;
        let bbox = match (min, max) {
            (Some(min), Some(max)) => Some((min, max)),
            (None, None) => None,
            _ => eyre::bail!("bounding box needs both min and max corners"),
        };
        let translation = all_or_none([r.tx, r.ty, r.tz])
            .ok_or_else(|| eyre::eyre!("tx/ty/tz must be all set or all empty"))?;
        let surface = r
            .surface
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty());
        Ok(Self {
            t_ms: r.t_ms,
            kind: r.kind,
            anchor_id: r.anchor_id.trim().to_string(),
            bbox,
            translation,
            surface,
        })
    }
}

pub const SCENARIO_HEADERS: [&str; 13] = [
    "t_ms", "kind", "anchor_id", "min_x", "min_y", "min_z", "max_x", "max_y", "max_z", "tx", "ty",
    "tz", "surface",
];

/// Load a scenario CSV, returning its events sorted by timestamp.
///
/// Rows with equal timestamps keep their file order.
pub fn load_scenario_csv(path: &std::path::Path) -> eyre::Result<Vec<ScenarioEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open scenario CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != SCENARIO_HEADERS {
        eyre::bail!(
            "scenario CSV must have headers '{}', got: {}",
            SCENARIO_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut events = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScenarioRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        let ev = ScenarioEvent::try_from(row)
            .map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        events.push(ev);
    }
    events.sort_by_key(|e| e.t_ms);
    Ok(events)
}
