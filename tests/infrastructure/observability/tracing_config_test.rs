use whisper_asr::infrastructure::observability::TracingConfig;

#[test]
fn given_default_config_when_created_then_level_is_info() {
    let config = TracingConfig::default();

    assert_eq!(config.level, "info");
    assert!(!config.environment.is_empty());
}

#[test]
fn given_level_when_building_directives_then_crate_and_http_are_debug() {
    let config = TracingConfig::new("test", true, "warn");

    assert_eq!(
        config.filter_directives(),
        "warn,whisper_asr=debug,tower_http=debug"
    );
    assert!(config.json_format);
}
