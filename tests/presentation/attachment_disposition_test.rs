use whisper_asr::presentation::handlers::attachment_disposition;

#[test]
fn given_plain_basename_when_building_disposition_then_quotes_the_filename() {
    assert_eq!(
        attachment_disposition("lecture", "srt"),
        "attachment; filename=\"lecture.srt\""
    );
}

#[test]
fn given_quote_and_backslash_when_building_disposition_then_they_are_dropped() {
    assert_eq!(
        attachment_disposition("my\"cl\\ip", "txt"),
        "attachment; filename=\"myclip.txt\""
    );
}

#[test]
fn given_control_characters_when_building_disposition_then_header_stays_on_one_line() {
    let disposition = attachment_disposition("clip\r\nX-Injected: 1", "vtt");

    assert_eq!(disposition, "attachment; filename=\"clipX-Injected: 1.vtt\"");
    assert!(axum::http::HeaderValue::from_str(&disposition).is_ok());
}

#[test]
fn given_only_unsafe_characters_when_building_disposition_then_falls_back_to_audio() {
    assert_eq!(
        attachment_disposition("\"\\", "json"),
        "attachment; filename=\"audio.json\""
    );
}
