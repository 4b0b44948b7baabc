use echowalk_config::load_toml;
use rstest::rstest;

#[rstest]
#[case("[alerts]\ncooldown_ms = 0\n", "alerts.cooldown_ms must be >= 1")]
#[case(
    "[alerts]\nmin_distance_m = 2.5\nproximity_threshold_m = 2.0\n",
    "min_distance_m must be < alerts.proximity_threshold_m"
)]
#[case("[alerts]\nlarge_obstacle_max_m = 3.0\n", "large_obstacle_max_m must be in")]
#[case("[alerts]\nlarge_obstacle_area_m2 = 0.0\n", "large_obstacle_area_m2 must be > 0")]
#[case("[tracker]\ntick_ms = 0\n", "tracker.tick_ms must be >= 1")]
#[case("[tracker]\nwake_ms = 0\n", "tracker.wake_ms must be >= 1")]
#[case("[tracker]\nwake_ms = 600\n", "wake_ms must be <= tracker.tick_ms")]
#[case("[tracker]\ndecay = 1.0\n", "tracker.decay must be in [0.0, 1.0)")]
#[case("[tracker]\ndisplacement_gain = -1.0\n", "displacement_gain must be > 0")]
#[case(
    "[tracker]\nhuman_score = 3.0\nobject_score = 2.0\n",
    "human_score must be <= tracker.object_score"
)]
#[case("[tracker]\nhuman_confirm_ms = 0\n", "tracker.human_confirm_ms must be >= 1")]
#[case("[speech]\ngrace_ms = 60000\n", "speech.grace_ms is unreasonably large")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "expected {needle:?} in {msg:?}");
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[alerts]
proximity_warnings_enabled = false
cooldown_ms = 2500
proximity_threshold_m = 2.5
min_distance_m = 0.2
large_obstacle_max_m = 1.2
large_obstacle_area_m2 = 0.8

[tracker]
tick_ms = 400
wake_ms = 50
decay = 0.7
displacement_gain = 4.0
human_score = 0.9
object_score = 1.8
human_confirm_ms = 1500

[speech]
grace_ms = 200

[display]
wireframe = true

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert!(!cfg.alerts.proximity_warnings_enabled);
    assert_eq!(cfg.tracker.human_confirm_ms, 1500);
    assert!(cfg.display.wireframe);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn unknown_field_types_fail_to_parse() {
    assert!(load_toml("[alerts]\ncooldown_ms = \"soon\"\n").is_err());
}
