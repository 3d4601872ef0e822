use whisper_asr::application::ports::CompleteTranscript;
use whisper_asr::application::services::{ResultAssembler, ResultMetadata};
use whisper_asr::domain::{Method, OutputFormat, Segment, TimedSteps, TranscriptionResult};
use whisper_asr::infrastructure::output::{format_timestamp, writer_for};

fn result_with(segments: Vec<Segment>, text: &str) -> TranscriptionResult {
    ResultAssembler::assemble(
        CompleteTranscript {
            language: "en".to_string(),
            segments,
            text: text.to_string(),
            duration: None,
        },
        ResultMetadata {
            requested_language: None,
            duration: Some(63.0),
            method: Method::Reference,
            gpu: false,
            model: "base".to_string(),
            file_id: "clip".to_string(),
            timings: TimedSteps::new(),
        },
    )
}

fn render(format: OutputFormat, result: &TranscriptionResult) -> String {
    String::from_utf8(writer_for(format).render(result).unwrap()).unwrap()
}

fn sample() -> TranscriptionResult {
    result_with(
        vec![
            Segment::new(61.5, 62.25, " Hello --> world. "),
            Segment::new(62.25, 63.0, " Tab\there."),
        ],
        " Hello --> world.  Tab\there.",
    )
}

#[test]
fn given_segment_when_rendering_srt_then_comma_millis_and_index() {
    let srt = render(OutputFormat::Srt, &sample());

    assert_eq!(
        srt,
        "1\n00:01:01,500 --> 00:01:02,250\nHello -> world.\n\n\
         2\n00:01:02,250 --> 00:01:03,000\nTab\there.\n\n"
    );
}

#[test]
fn given_segment_when_rendering_vtt_then_header_and_dot_millis() {
    let vtt = render(OutputFormat::Vtt, &sample());

    assert!(vtt.starts_with("WEBVTT\n\n00:01:01.500 --> 00:01:02.250\n"));
    assert!(!vtt.contains("\n1\n"));
}

#[test]
fn given_segment_when_rendering_tsv_then_integer_millis_and_no_inner_tabs() {
    let tsv = render(OutputFormat::Tsv, &sample());

    assert_eq!(
        tsv,
        "start\tend\ttext\n61500\t62250\tHello --> world.\n62250\t63000\tTab here.\n"
    );
}

#[test]
fn given_segments_when_rendering_txt_then_one_trimmed_line_each() {
    let txt = render(OutputFormat::Txt, &sample());

    assert_eq!(txt, "Hello --> world.\nTab\there.\n");
}

#[test]
fn given_text_without_segments_when_rendering_txt_then_falls_back_to_text() {
    let txt = render(OutputFormat::Txt, &result_with(vec![], "  Whole transcript. "));

    assert_eq!(txt, "Whole transcript.\n");
}

#[test]
fn given_empty_result_when_rendering_every_format_then_output_is_valid_and_empty() {
    let empty = result_with(vec![], "");

    assert_eq!(render(OutputFormat::Txt, &empty), "");
    assert_eq!(render(OutputFormat::Srt, &empty), "");
    assert_eq!(render(OutputFormat::Vtt, &empty), "WEBVTT\n\n");
    assert_eq!(render(OutputFormat::Tsv, &empty), "start\tend\ttext\n");

    let json: serde_json::Value =
        serde_json::from_str(&render(OutputFormat::Json, &empty)).unwrap();
    assert_eq!(json["segments"].as_array().unwrap().len(), 0);
    assert_eq!(json["text"], "");
}

#[test]
fn given_result_when_rendering_json_then_all_fields_present() {
    let json: serde_json::Value =
        serde_json::from_str(&render(OutputFormat::Json, &sample())).unwrap();

    for field in [
        "language", "segments", "text", "method", "gpu", "model", "duration", "file_id",
        "timings",
    ] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(json["duration"], 63.0);
    assert_eq!(json["method"], "reference");
}

#[test]
fn given_fractional_millis_when_formatting_then_rounds_to_nearest() {
    assert_eq!(format_timestamp(0.0004, ','), "00:00:00,000");
    assert_eq!(format_timestamp(0.0006, ','), "00:00:00,001");
    assert_eq!(format_timestamp(3725.5, '.'), "01:02:05.500");
}
