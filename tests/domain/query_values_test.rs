use whisper_asr::domain::{Method, ModelName, OutputFormat, Task};

#[test]
fn given_wire_names_when_parsing_methods_then_round_trip_through_display() {
    for method in Method::ALL {
        assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
    }
}

#[test]
fn given_unknown_method_when_parsing_then_error_lists_choices() {
    let err = "turbo".parse::<Method>().unwrap_err();

    assert!(err.to_string().contains("reference, streaming"));
}

#[test]
fn given_translate_when_parsing_task_then_translate() {
    assert_eq!("translate".parse::<Task>().unwrap(), Task::Translate);
    assert_eq!(Task::default(), Task::Transcribe);
    assert!("summarize".parse::<Task>().is_err());
}

#[test]
fn given_output_formats_when_parsing_then_extension_matches_wire_name() {
    for name in ["txt", "vtt", "srt", "tsv", "json"] {
        let format: OutputFormat = name.parse().unwrap();
        assert_eq!(format.extension(), name);
    }
    assert!("docx".parse::<OutputFormat>().is_err());
}

#[test]
fn given_english_only_model_when_parsing_then_flagged() {
    let model: ModelName = "small.en".parse().unwrap();

    assert!(model.is_english_only());
    assert_eq!(model.hub_repository(), "openai/whisper-small.en");
}

#[test]
fn given_unknown_model_when_parsing_then_error() {
    assert!("gigantic".parse::<ModelName>().is_err());
}
