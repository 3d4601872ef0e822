use whisper_asr::domain::{LANGUAGES, Language};

#[test]
fn given_known_code_when_parsing_then_name_is_english_name() {
    let language: Language = "de".parse().unwrap();

    assert_eq!(language.code(), "de");
    assert_eq!(language.name(), "german");
}

#[test]
fn given_unknown_code_when_parsing_then_error_names_code() {
    let err = "xx".parse::<Language>().unwrap_err();

    assert!(err.to_string().contains("xx"));
}

#[test]
fn given_language_table_when_listing_then_codes_are_unique() {
    let mut codes: Vec<&str> = LANGUAGES.iter().map(|(code, _)| *code).collect();
    codes.sort_unstable();
    codes.dedup();

    assert_eq!(codes.len(), LANGUAGES.len());
    assert_eq!(Language::all().count(), LANGUAGES.len());
}
