//! Human-readable weekly time-range syntax used at the API boundary.
//!
//! `"Mon 13:00-15:30"` -> `(day=0, start_min=780, end_min=930)`. Days are
//! 0=Mon .. 6=Sun; times are minutes since midnight. Malformed input is a
//! validation error, never silently clamped.

use buddy_shared::errors::{AppError, AppResult};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Name of a day index, for display. Callers only hold validated days.
pub fn day_name(day_of_week: i16) -> &'static str {
    DAY_NAMES
        .get(day_of_week as usize)
        .copied()
        .unwrap_or("???")
}

/// Parse `"HH:MM"` into minutes since midnight. `"24:00"` is allowed as the
/// exclusive end of day (1440).
pub fn hhmm_to_minutes(text: &str) -> AppResult<i32> {
    let (hh, mm) = text
        .split_once(':')
        .ok_or_else(|| AppError::Validation(format!("expected HH:MM, got {text:?}")))?;
    let hours: i32 = hh
        .parse()
        .map_err(|_| AppError::Validation(format!("bad hour in {text:?}")))?;
    let minutes: i32 = mm
        .parse()
        .map_err(|_| AppError::Validation(format!("bad minute in {text:?}")))?;
    if !(0..=59).contains(&minutes) || !(0..=24).contains(&hours) {
        return Err(AppError::Validation(format!("time out of range: {text:?}")));
    }
    let total = hours * 60 + minutes;
    if total > 1440 {
        return Err(AppError::Validation(format!("time out of range: {text:?}")));
    }
    Ok(total)
}

/// Format minutes since midnight as `"HH:MM"`.
pub fn minutes_to_hhmm(total: i32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `"<Dow> HH:MM-HH:MM"` into `(day_of_week, start_min, end_min)`.
///
/// The day token matches case-insensitively on its first three letters, so
/// `"Monday"`, `"mon"` and `"MON"` all mean day 0. Interval validity
/// (`start < end`) is enforced by the callers that create rows, not here.
pub fn parse_range(text: &str) -> AppResult<(i16, i32, i32)> {
    let (day_part, time_part) = text
        .trim()
        .split_once(' ')
        .ok_or_else(|| AppError::Validation(format!("expected \"<Dow> HH:MM-HH:MM\", got {text:?}")))?;
    let (start_text, end_text) = time_part
        .split_once('-')
        .ok_or_else(|| AppError::Validation(format!("expected HH:MM-HH:MM, got {time_part:?}")))?;

    let prefix = day_part.to_ascii_lowercase();
    let day = DAY_NAMES
        .iter()
        .position(|d| prefix.starts_with(&d.to_ascii_lowercase()))
        .ok_or_else(|| AppError::Validation(format!("unknown day: {day_part:?}")))?
        as i16;

    let start_min = hhmm_to_minutes(start_text.trim())?;
    let end_min = hhmm_to_minutes(end_text.trim())?;
    Ok((day, start_min, end_min))
}

/// Render a window as the same syntax `parse_range` accepts.
pub fn format_range(day_of_week: i16, start_min: i32, end_min: i32) -> String {
    format!(
        "{} {}-{}",
        day_name(day_of_week),
        minutes_to_hhmm(start_min),
        minutes_to_hhmm(end_min)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_documented_example() {
        assert_eq!(parse_range("Mon 13:00-15:30").unwrap(), (0, 780, 930));
    }

    #[test]
    fn day_token_is_case_insensitive_on_first_three_letters() {
        assert_eq!(parse_range("monday 09:00-10:00").unwrap().0, 0);
        assert_eq!(parse_range("THU 09:00-10:00").unwrap().0, 3);
        assert_eq!(parse_range("Sunday 09:00-10:00").unwrap().0, 6);
    }

    #[test]
    fn end_of_day_is_allowed() {
        assert_eq!(parse_range("Fri 23:00-24:00").unwrap(), (4, 1380, 1440));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_range("Mon").is_err());
        assert!(parse_range("Mon 13:00").is_err());
        assert!(parse_range("Xyz 13:00-14:00").is_err());
        assert!(parse_range("Mon 13:60-14:00").is_err());
        assert!(parse_range("Mon 25:00-26:00").is_err());
    }

    #[test]
    fn formats_round_trip() {
        assert_eq!(format_range(0, 780, 930), "Mon 13:00-15:30");
        assert_eq!(minutes_to_hhmm(0), "00:00");
        assert_eq!(minutes_to_hhmm(1440), "24:00");
    }
}
