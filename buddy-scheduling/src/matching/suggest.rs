//! Overlap matcher: turns two sets of weekly windows into ranked meeting
//! suggestions.
//!
//! The candidate set arrives already scoped to classmates of the querying
//! user (co-enrolled in the course, user excluded); the matcher itself is a
//! pure nested scan over the two sets and never touches storage.

use crate::matching::interval;
use crate::models::{AvailabilityWindow, MatchSuggestion};

/// Compare suggestions by the canonical output order: longest overlap first,
/// then earliest day, then earliest start, then partner id as the final
/// disambiguator so identical inputs always produce identical output.
fn suggestion_order(a: &MatchSuggestion, b: &MatchSuggestion) -> std::cmp::Ordering {
    b.minutes
        .cmp(&a.minutes)
        .then(a.day_of_week.cmp(&b.day_of_week))
        .then(a.overlap_start_min.cmp(&b.overlap_start_min))
        .then(a.partner_id.cmp(&b.partner_id))
}

/// Rank every overlapping `(mine, theirs)` window pair whose overlap is at
/// least `min_minutes` long.
///
/// Suggestions identical on `(partner, day, overlap range)` collapse to one;
/// distinct overlap ranges for the same partner are all kept. Output order is
/// total and reproducible regardless of input iteration order.
pub fn suggest_matches(
    my_windows: &[AvailabilityWindow],
    candidate_windows: &[AvailabilityWindow],
    min_minutes: i32,
) -> Vec<MatchSuggestion> {
    let mut out = Vec::new();

    for mine in my_windows {
        for theirs in candidate_windows {
            if !interval::overlaps(mine, theirs) {
                continue;
            }
            let minutes = interval::overlap_minutes(mine, theirs);
            if minutes < min_minutes {
                continue;
            }
            out.push(MatchSuggestion {
                partner_id: theirs.owner_id,
                day_of_week: mine.day_of_week,
                overlap_start_min: mine.start_min.max(theirs.start_min),
                overlap_end_min: mine.end_min.min(theirs.end_min),
                minutes,
            });
        }
    }

    // Equal tuples sort adjacent, so dedup after the sort collapses them.
    out.sort_by(suggestion_order);
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn window_for(owner: Uuid, day: i16, start: i32, end: i32) -> AvailabilityWindow {
        AvailabilityWindow {
            id: Uuid::new_v4(),
            owner_id: owner,
            day_of_week: day,
            start_min: start,
            end_min: end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn documented_example_yields_one_suggestion() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let mine = vec![window_for(me, 0, 780, 900)]; // Mon 13:00-15:00
        let theirs = vec![window_for(partner, 0, 840, 960)]; // Mon 14:00-16:00

        let suggestions = suggest_matches(&mine, &theirs, 30);
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.partner_id, partner);
        assert_eq!(s.day_of_week, 0);
        assert_eq!(s.overlap_start_min, 840); // 14:00
        assert_eq!(s.overlap_end_min, 900); // 15:00
        assert_eq!(s.minutes, 60);
    }

    #[test]
    fn threshold_is_a_strict_filter() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let mine = vec![window_for(me, 0, 780, 900)];
        let theirs = vec![window_for(partner, 0, 840, 960)];

        assert!(suggest_matches(&mine, &theirs, 61).is_empty());
        assert_eq!(suggest_matches(&mine, &theirs, 60).len(), 1);
    }

    #[test]
    fn touching_windows_never_match() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let mine = vec![window_for(me, 0, 780, 840)];
        let theirs = vec![window_for(partner, 0, 840, 900)];

        assert!(suggest_matches(&mine, &theirs, 0).is_empty());
    }

    #[test]
    fn output_order_is_deterministic_across_input_orderings() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mine = vec![
            window_for(me, 0, 600, 720),
            window_for(me, 2, 600, 840),
            window_for(me, 4, 600, 660),
        ];
        let mut theirs = vec![
            window_for(p1, 0, 630, 720),  // 90 min overlap, Mon
            window_for(p2, 2, 600, 780),  // 180 min overlap, Wed
            window_for(p1, 2, 660, 840),  // 180 min overlap, Wed, later start
            window_for(p2, 4, 600, 660),  // 60 min overlap, Fri
        ];

        let forward = suggest_matches(&mine, &theirs, 30);
        theirs.reverse();
        let reversed = suggest_matches(&mine, &theirs, 30);
        assert_eq!(forward, reversed);

        // minutes desc, then day asc, then start asc
        assert_eq!(forward.len(), 4);
        assert_eq!(forward[0].minutes, 180);
        assert_eq!(forward[0].overlap_start_min, 600);
        assert_eq!(forward[1].minutes, 180);
        assert_eq!(forward[1].overlap_start_min, 660);
        assert_eq!(forward[2].minutes, 90);
        assert_eq!(forward[3].minutes, 60);
    }

    #[test]
    fn identical_overlap_tuples_collapse() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        // Two of my windows produce the exact same overlap with the partner.
        let mine = vec![
            window_for(me, 1, 600, 720),
            window_for(me, 1, 600, 720),
        ];
        let theirs = vec![window_for(partner, 1, 600, 720)];

        let suggestions = suggest_matches(&mine, &theirs, 30);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].minutes, 120);
    }

    #[test]
    fn distinct_ranges_for_same_partner_are_kept() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let mine = vec![window_for(me, 1, 540, 1020)];
        let theirs = vec![
            window_for(partner, 1, 540, 660),
            window_for(partner, 1, 720, 840),
        ];

        let suggestions = suggest_matches(&mine, &theirs, 30);
        assert_eq!(suggestions.len(), 2);
        assert_ne!(
            suggestions[0].overlap_start_min,
            suggestions[1].overlap_start_min
        );
    }

    #[test]
    fn empty_inputs_produce_no_suggestions() {
        let me = Uuid::new_v4();
        assert!(suggest_matches(&[], &[], 30).is_empty());
        assert!(suggest_matches(&[window_for(me, 0, 0, 60)], &[], 30).is_empty());
    }
}
