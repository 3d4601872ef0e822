use whisper_asr::infrastructure::observability::sanitize_prompt;

#[test]
fn given_empty_prompt_when_sanitizing_then_returns_empty_marker() {
    assert_eq!(sanitize_prompt(""), "[EMPTY]");
    assert_eq!(sanitize_prompt("   "), "[EMPTY]");
}

#[test]
fn given_short_prompt_when_sanitizing_then_returns_trimmed() {
    assert_eq!(sanitize_prompt("  Glossary: Kubernetes, gRPC  "), "Glossary: Kubernetes, gRPC");
}

#[test]
fn given_long_multibyte_prompt_when_sanitizing_then_truncates_on_char_boundary() {
    let prompt = "é".repeat(150);

    let result = sanitize_prompt(&prompt);

    assert!(result.starts_with(&"é".repeat(100)));
    assert!(result.ends_with("... (150 chars total)"));
}

#[test]
fn given_repeated_secrets_when_sanitizing_then_every_occurrence_is_redacted() {
    let result = sanitize_prompt("token=abc then token=def");

    assert_eq!(result, "token=[REDACTED] then token=[REDACTED]");
}

#[test]
fn given_bearer_token_when_sanitizing_then_redacts_token() {
    let result = sanitize_prompt("Authorization: Bearer sk-abc123xyz");

    assert!(result.contains("Bearer [REDACTED]"));
    assert!(!result.contains("sk-abc123xyz"));
}
