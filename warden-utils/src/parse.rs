use std::time::Duration;

use thiserror::Error;

/// Longest timed mute the platform accepts.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Why a manual timeout duration was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("a duration is required")]
    Empty,
    #[error("`{0}` must start with a positive whole number")]
    InvalidMagnitude(String),
    #[error("`{0}` is missing a unit (s, m or h)")]
    MissingUnit(String),
    #[error("`{0}` is not a known unit; use seconds, minutes or hours")]
    UnknownUnit(String),
    #[error("timeouts can last at most {max_days} days")]
    TooLong { max_days: u64 },
}

/// Parse a manual timeout token like `30s`, `10 min`, or `2hours`.
///
/// The magnitude must be a positive integer and the unit one of seconds,
/// minutes, or hours.
pub fn parse_timeout_duration(raw: &str) -> Result<Duration, DurationParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    let magnitude = number
        .parse::<u64>()
        .ok()
        .filter(|magnitude| *magnitude > 0)
        .ok_or_else(|| DurationParseError::InvalidMagnitude(value.to_owned()))?;

    let unit = unit.trim();
    if unit.is_empty() {
        return Err(DurationParseError::MissingUnit(value.to_owned()));
    }

    let unit_seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1_u64,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60 * 60,
        _ => return Err(DurationParseError::UnknownUnit(unit.to_owned())),
    };

    let too_long = DurationParseError::TooLong {
        max_days: MAX_TIMEOUT.as_secs() / 86_400,
    };
    let seconds = magnitude.checked_mul(unit_seconds).ok_or(too_long.clone())?;
    let duration = Duration::from_secs(seconds);
    if duration > MAX_TIMEOUT {
        return Err(too_long);
    }

    Ok(duration)
}

/// Split a leading duration off `input` and return it with the trimmed remainder.
///
/// A bare number followed by a separate unit word (`10 m spam`) is read as one
/// duration, so prefix invocations accept the spaced form too.
pub fn parse_leading_timeout(input: &str) -> Result<(Duration, &str), DurationParseError> {
    let input = input.trim_start();
    let mut end = token_end(input);

    if end < input.len() && input[..end].bytes().all(|byte| byte.is_ascii_digit()) {
        let after = &input[end..];
        let unit_start = end + (after.len() - after.trim_start().len());
        end = unit_start + token_end(&input[unit_start..]);
    }

    let duration = parse_timeout_duration(&input[..end])?;
    Ok((duration, input[end..].trim()))
}

fn token_end(text: &str) -> usize {
    text.find(char::is_whitespace).unwrap_or(text.len())
}

/// Number of warnings to remove. Missing, non-numeric, or non-positive input means 1.
pub fn parse_removal_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(1)
}
