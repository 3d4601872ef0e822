use whisper_asr::domain::TimedSteps;

#[test]
fn given_duplicate_name_when_recording_then_first_write_wins() {
    let mut steps = TimedSteps::new();

    assert!(steps.record("load", 1.5));
    assert!(!steps.record("load", 9.0));

    assert_eq!(steps.get("load"), Some(1.5));
}

#[test]
fn given_negative_seconds_when_recording_then_clamped_to_zero() {
    let mut steps = TimedSteps::new();
    steps.record("skew", -0.25);

    assert_eq!(steps.get("skew"), Some(0.0));
}

#[test]
fn given_steps_when_serializing_then_map_keeps_insertion_order() {
    let mut steps = TimedSteps::new();
    steps.record("b", 2.0);
    steps.record("a", 1.0);

    let json = serde_json::to_string(&steps).unwrap();

    assert_eq!(json, r#"{"b":2.0,"a":1.0}"#);
}
