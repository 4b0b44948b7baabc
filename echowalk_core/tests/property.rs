use std::sync::Arc;
use std::time::Duration;

use echowalk_core::mocks::RecordingSynthesizer;
use echowalk_core::{
    AnchorId, BoundingBox, Engine, EngineNotice, Geometry, GeometryEvent, MotionTracker,
    SpeechEvent, SpeechRequest, TrackerCfg, Transform, Vec3, classify,
};
use echowalk_traits::{Clock, ManualClock};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Add { id: u8, w: f32, h: f32, d: f32, z: f32 },
    Move { id: u8, z: f32 },
    Remove { id: u8 },
    Tick,
    Wait { ms: u64 },
    Finish,
}

prop_compose! {
    fn dims()(w in 0.05f32..3.0, h in 0.05f32..2.5, d in 0.05f32..1.5) -> (f32, f32, f32) {
        (w, h, d)
    }
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..6, dims(), 0.0f32..3.0).prop_map(|(id, (w, h, d), z)| Step::Add { id, w, h, d, z }),
        (0u8..6, 0.0f32..3.0).prop_map(|(id, z)| Step::Move { id, z }),
        (0u8..6).prop_map(|id| Step::Remove { id }),
        Just(Step::Tick),
        (1u64..2000).prop_map(|ms| Step::Wait { ms }),
        Just(Step::Finish),
    ]
}

fn centered(w: f32, h: f32, d: f32) -> BoundingBox {
    BoundingBox::new(
        Vec3::new(-w / 2.0, -h / 2.0, -d / 2.0),
        Vec3::new(w / 2.0, h / 2.0, d / 2.0),
    )
}

fn ahead(z: f32) -> Transform {
    Transform::from_translation(Vec3::new(0.0, 0.0, -z))
}

fn run(
    steps: &[Step],
    mut check: impl FnMut(&Engine<RecordingSynthesizer>, &ManualClock, &[EngineNotice]),
) {
    let clock = ManualClock::new();
    let mut e = Engine::builder()
        .with_synthesizer(RecordingSynthesizer::default())
        .with_clock(Arc::new(clock.clone()))
        .build()
        .expect("engine");
    for s in steps {
        match *s {
            Step::Add { id, w, h, d, z } => e.apply_geometry(GeometryEvent::Added(
                AnchorId::from(format!("a{id}")),
                Geometry::new(centered(w, h, d), ahead(z)),
            )),
            Step::Move { id, z } => e.apply_geometry(GeometryEvent::Updated(
                AnchorId::from(format!("a{id}")),
                Geometry {
                    transform: Some(ahead(z)),
                    ..Geometry::default()
                },
            )),
            Step::Remove { id } => {
                e.apply_geometry(GeometryEvent::Removed(AnchorId::from(format!("a{id}"))))
            }
            Step::Tick => e.motion_tick(),
            Step::Wait { ms } => {
                clock.advance(Duration::from_millis(ms));
                e.poll();
            }
            Step::Finish => {
                if let Some((id, _)) = e.speech().current() {
                    e.on_speech_event(SpeechEvent::Finished(id));
                }
            }
        }
        let notices = e.take_notices();
        check(&e, &clock, &notices);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn tracker_never_outlives_registry(steps in prop::collection::vec(step(), 1..80)) {
        run(&steps, |e, _, _| {
            for id in e.tracker().ids() {
                assert!(e.registry().contains(id), "stale motion state for {id}");
            }
        });
    }

    #[test]
    fn warnings_are_spaced_by_more_than_the_cooldown(steps in prop::collection::vec(step(), 1..80)) {
        let mut last = None;
        run(&steps, |e, clock, notices| {
            for n in notices {
                if let EngineNotice::Warning { .. } = n {
                    let now = clock.now();
                    if let Some(prev) = last {
                        let gap = now.saturating_duration_since(prev);
                        assert!(gap > e.alerts().cfg().cooldown(), "gap {gap:?}");
                    }
                    last = Some(now);
                }
            }
        });
    }

    #[test]
    fn busy_queue_drops_warnings(steps in prop::collection::vec(step(), 1..60)) {
        let clock = ManualClock::new();
        let mut e = Engine::builder()
            .with_synthesizer(RecordingSynthesizer::default())
            .with_clock(Arc::new(clock.clone()))
            .build()
            .expect("engine");
        e.say(SpeechRequest::Enqueue("Navigation instruction".into()));
        for s in steps.iter().filter(|s| !matches!(s, Step::Finish)) {
            match *s {
                Step::Add { id, w, h, d, z } => e.apply_geometry(GeometryEvent::Added(
                    AnchorId::from(format!("a{id}")),
                    Geometry::new(centered(w, h, d), ahead(z)),
                )),
                Step::Tick => e.motion_tick(),
                Step::Wait { ms } => clock.advance(Duration::from_millis(ms)),
                _ => {}
            }
        }
        prop_assert_eq!(e.synthesizer().spoken().len(), 1);
        for n in e.take_notices() {
            if let EngineNotice::Warning { accepted, .. } = n {
                prop_assert!(!accepted);
            }
        }
    }

    #[test]
    fn stationary_score_decays_monotonically(
        moves in prop::collection::vec(0.0f32..1.0, 1..10),
        still in 1usize..30,
    ) {
        let mut t = MotionTracker::new(TrackerCfg::default());
        let id = AnchorId::from("m");
        let bbox = centered(0.5, 0.5, 0.5);
        let now = std::time::Instant::now();
        let mut z = 0.0;
        for dz in &moves {
            z += dz;
            t.observe(&id, Vec3::new(0.0, 0.0, z), &bbox, now);
        }
        let mut prev = t.score(&id).expect("tracked");
        for _ in 0..still {
            let s = t.observe(&id, Vec3::new(0.0, 0.0, z), &bbox, now).score;
            prop_assert!(s <= prev);
            prop_assert!(s >= 0.0);
            prev = s;
        }
    }

    #[test]
    fn classification_is_deterministic(
        (w, h, d) in dims(),
        lift in -1.0f32..3.0,
    ) {
        let b = BoundingBox::new(Vec3::new(0.0, lift, 0.0), Vec3::new(w, lift + h, d));
        let first = classify(&b);
        for _ in 0..3 {
            prop_assert_eq!(classify(&b), first);
        }
        prop_assert_eq!(classify(&BoundingBox::new(b.min, b.max)), first);
    }
}
