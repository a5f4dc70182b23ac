//! Pure interval math over weekly availability windows.
//!
//! Windows are half-open `[start_min, end_min)` ranges on a day of week.
//! Two windows that only touch at a boundary (one ends exactly where the
//! other starts) do not overlap.

use buddy_shared::errors::{AppError, AppResult};

use crate::models::AvailabilityWindow;

/// True iff `a` and `b` share a day and their minute ranges strictly overlap.
/// Symmetric in its arguments.
pub fn overlaps(a: &AvailabilityWindow, b: &AvailabilityWindow) -> bool {
    a.day_of_week == b.day_of_week && a.start_min < b.end_min && b.start_min < a.end_min
}

/// Exact overlap length in minutes; zero when the windows do not overlap.
/// Strictly positive iff `overlaps(a, b)`.
pub fn overlap_minutes(a: &AvailabilityWindow, b: &AvailabilityWindow) -> i32 {
    if !overlaps(a, b) {
        return 0;
    }
    a.end_min.min(b.end_min) - a.start_min.max(b.start_min)
}

/// Validate a day/time triple before anything is written.
///
/// Day must be 0..=6 and the range a non-empty half-open interval inside a
/// single day. Out-of-range input fails; it is never clamped.
pub fn validate_window(day_of_week: i16, start_min: i32, end_min: i32) -> AppResult<()> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::invalid_range(format!(
            "day_of_week must be 0..=6, got {day_of_week}"
        )));
    }
    if !(0 <= start_min && start_min < end_min && end_min <= 1440) {
        return Err(AppError::invalid_range(format!(
            "need 0 <= start < end <= 1440, got [{start_min}, {end_min})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
