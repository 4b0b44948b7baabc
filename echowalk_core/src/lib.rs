#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Obstacle tracking and alert arbitration for a blind-navigation aid.
//!
//! A scan source reports anchors (planes and objects) with bounding boxes and
//! poses. The engine classifies them, tracks their motion, decides which
//! single spoken warning may fire at any moment, and serializes everything
//! that reaches the speech synthesizer.
//!
//! ## Architecture
//!
//! - **Geometry**: `Vec3`, `BoundingBox`, column-major `Transform` (`geometry`)
//! - **Classification**: ordered size rules for surfaces and furniture (`classifier`)
//! - **Registry**: the authoritative set of live anchors (`registry`)
//! - **Motion**: decaying displacement scores and human-shape confirmation (`motion`)
//! - **Alerts**: one global `CooldownGate` shared by every warning channel (`alerts`)
//! - **Speech**: one utterance at a time, with a grace pause between items (`speech`)
//! - **Runtime**: the single-owner `Engine`, its threaded `EngineRunner` and the
//!   motion `Ticker`
//!
//! ## Units
//!
//! Geometry is in metres. Spoken distances are whole centimetres, truncated.

pub mod alerts;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod conversions;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod mocks;
pub mod motion;
pub mod registry;
pub mod runner;
pub mod speech;
pub mod ticker;
pub mod util;

pub use alerts::{Observation, ProximityAlertEngine, Warning, WarningKind};
pub use builder::{EngineBuilder, Missing, Set};
pub use classifier::{Category, classify, classify_with_hint};
pub use config::{AlertCfg, EngineSettings, SpeechCfg, TrackerCfg};
pub use cooldown::CooldownGate;
pub use engine::{Engine, EngineMsg, EngineNotice, SpeechRequest};
pub use error::{BuildError, EngineError, Result};
pub use geometry::{BoundingBox, Transform, Vec3};
pub use motion::{MotionKind, MotionSignal, MotionTracker};
pub use registry::{
    Anchor, AnchorId, AnchorRegistry, AnchorSnapshot, DisplayStyle, Geometry, GeometryEvent,
    RegistryChange,
};
pub use runner::{EngineHandle, EngineInbox, EngineRunner, SpeechCallback, channel};
pub use speech::{SpeechEvent, SpeechNotice, SpeechQueue, SpeechState};
pub use ticker::Ticker;
pub use util::truncate_cm;

pub use echowalk_traits::{Synthesizer, UtteranceId};
