use super::*;
use crate::field::particles::Motion;

#[test]
fn empty_object_is_the_stock_scene() {
    let cfg = BackdropConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, BackdropConfig::default());
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.galaxy.count, 2500);
    assert_eq!(cfg.shell.as_ref().map(|s| s.count), Some(600));
    assert_eq!(cfg.wave.segments, [128, 128]);
}

#[test]
fn json_round_trips_through_pretty_output() {
    let mut cfg = BackdropConfig::default();
    cfg.seed = 99;
    cfg.shell = None;
    cfg.pointer = PointerPath::Orbit {
        radius: 0.5,
        period_secs: 8.0,
    };
    let json = cfg.to_json_pretty().unwrap();
    let back = BackdropConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let json = r#"{
        "canvas": { "width": 320, "height": 180 },
        "galaxy": {
            "count": 100,
            "distribution": { "kind": "galaxy" },
            "motion": { "kind": "still" }
        }
    }"#;
    let cfg = BackdropConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.canvas.width, 320);
    assert_eq!(cfg.galaxy.count, 100);
    assert_eq!(cfg.galaxy.motion, Motion::Still);
    assert_eq!(cfg.environment, EnvironmentConfig::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = BackdropConfig::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(matches!(err, NebulaError::Serde(_)));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = BackdropConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn validation_covers_nested_sections() {
    let mut cfg = BackdropConfig::default();
    cfg.canvas.width = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = BackdropConfig::default();
    cfg.fps.den = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = BackdropConfig::default();
    cfg.galaxy.count = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = BackdropConfig::default();
    cfg.wave.opacity = 2.0;
    assert!(cfg.validate().is_err());
}
