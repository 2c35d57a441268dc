//! Countdown text entry and overlay formatting
//!
//! Accepted input forms are `SS`, `MM:SS` and `HH:MM:SS`. Fields are not
//! range-checked against each other, so `"2:90"` is 210 seconds. Blank input
//! means "no countdown" and parses to zero. Anything longer than
//! [`MAX_TIMER_DURATION`] is rejected.

use std::time::Duration;

use super::engine::MAX_TIMER_DURATION;
use crate::error::ClockError;

/// Parse countdown text into a duration.
pub fn parse_timer_text(text: &str) -> Result<Duration, ClockError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Duration::ZERO);
    }

    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(ClockError::InvalidTimerText(text.to_string()));
    }

    let mut seconds: u64 = 0;
    for part in &parts {
        let value = parse_field(part).ok_or_else(|| ClockError::InvalidTimerText(text.to_string()))?;
        seconds = seconds
            .checked_mul(60)
            .and_then(|s| s.checked_add(value))
            .ok_or_else(|| ClockError::InvalidTimerText(text.to_string()))?;
    }

    let duration = Duration::from_secs(seconds);
    if duration > MAX_TIMER_DURATION {
        return Err(ClockError::InvalidTimerText(text.to_string()));
    }
    Ok(duration)
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Render a duration as `HH:MM:SS`, dropping sub-second precision.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, rest) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
