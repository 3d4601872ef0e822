use whisper_asr::application::ports::{
    BackendOutput, CompleteTranscript, InferenceError, SegmentStream,
};
use whisper_asr::application::services::{ResultAssembler, ResultMetadata};
use whisper_asr::domain::{Method, Segment, TimedSteps, UNKNOWN_DURATION};

fn metadata(requested_language: Option<&str>, duration: Option<f64>) -> ResultMetadata {
    ResultMetadata {
        requested_language: requested_language.map(String::from),
        duration,
        method: Method::Reference,
        gpu: false,
        model: "base".to_string(),
        file_id: "clip".to_string(),
        timings: TimedSteps::new(),
    }
}

fn transcript(language: &str, duration: Option<f64>) -> CompleteTranscript {
    CompleteTranscript {
        language: language.to_string(),
        segments: vec![Segment::new(0.0, 1.0, " Bonjour.")],
        text: " Bonjour.".to_string(),
        duration,
    }
}

#[test]
fn given_requested_language_when_assembling_then_it_overrides_detected() {
    let result = ResultAssembler::assemble(transcript("de", None), metadata(Some("fr"), Some(1.0)));

    assert_eq!(result.language(), "fr");
}

#[test]
fn given_no_requested_language_when_assembling_then_detected_is_used() {
    let result = ResultAssembler::assemble(transcript("de", None), metadata(None, Some(1.0)));

    assert_eq!(result.language(), "de");
}

#[test]
fn given_normalizer_duration_when_assembling_then_it_wins_over_backend() {
    let result = ResultAssembler::assemble(transcript("en", Some(9.0)), metadata(None, Some(3.0)));

    assert_eq!(result.duration(), 3.0);
}

#[test]
fn given_unknown_normalizer_duration_when_assembling_then_backend_duration_is_used() {
    let result = ResultAssembler::assemble(transcript("en", Some(9.0)), metadata(None, None));

    assert_eq!(result.duration(), 9.0);
}

#[test]
fn given_no_duration_anywhere_when_assembling_then_unknown_sentinel() {
    let result = ResultAssembler::assemble(transcript("en", None), metadata(None, None));

    assert_eq!(result.duration(), UNKNOWN_DURATION);
    assert_eq!(result.known_duration(), None);
}

#[test]
fn given_streaming_output_when_assembling_then_text_concatenates_segments() {
    let stream = SegmentStream::new(
        "en",
        Some(4.0),
        vec![
            Ok(Segment::new(0.0, 2.0, " One.")),
            Ok(Segment::new(2.0, 4.0, " Two.")),
        ]
        .into_iter(),
    );

    let result = ResultAssembler::assemble_output(
        BackendOutput::Streaming(stream),
        metadata(None, None),
    )
    .unwrap();

    assert_eq!(result.segments().len(), 2);
    assert_eq!(result.text(), " One. Two.");
    assert_eq!(result.duration(), 4.0);
}

#[test]
fn given_stream_error_when_assembling_then_no_partial_result() {
    let stream = SegmentStream::new(
        "en",
        None,
        vec![
            Ok(Segment::new(0.0, 2.0, " One.")),
            Err(InferenceError::TranscriptionFailed("boom".to_string())),
            Ok(Segment::new(4.0, 6.0, " Three.")),
        ]
        .into_iter(),
    );

    let result = ResultAssembler::assemble_output(
        BackendOutput::Streaming(stream),
        metadata(None, None),
    );

    assert!(matches!(result, Err(InferenceError::TranscriptionFailed(_))));
}
