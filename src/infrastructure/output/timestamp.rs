/// Whole milliseconds, rounded to nearest; negative inputs clamp to zero.
pub fn to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// `HH:MM:SS{separator}mmm`, hours always present.
pub fn format_timestamp(seconds: f64, separator: char) -> String {
    let millis = to_millis(seconds);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1_000;
    let ms = millis % 1_000;
    format!("{hours:02}:{minutes:02}:{secs:02}{separator}{ms:03}")
}
