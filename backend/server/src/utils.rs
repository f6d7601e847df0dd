use std::sync::LazyLock;

use regex::Regex;

pub const SENDER_NAME_MAX: usize = 120;
pub const ADDRESS_MAX: usize = 254;
pub const SUBJECT_MAX: usize = 200;
pub const BODY_MAX: usize = 10_000;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Collapses line breaks into single spaces and caps the length in chars.
///
/// Anything headed for the outbound message goes through here so a value can
/// never open a new header line.
pub fn safe_str(input: &str, max: usize) -> String {
    LINE_BREAKS
        .replace_all(input, " ")
        .chars()
        .take(max)
        .collect()
}

/// Shortest decimal form, so `10.0` reads `10` and `-0.0` reads `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    value.to_string()
}
