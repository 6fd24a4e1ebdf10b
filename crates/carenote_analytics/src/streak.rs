//! Logging streak and level progress.

use carenote_core::Note;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

const NOTES_PER_LEVEL: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    /// Consecutive logged days ending today or yesterday.
    pub days: u32,
    pub level: usize,
    /// Notes left until the next level.
    pub next_unlock: usize,
}

/// Compute the streak as of `today`. Notes with unparsable dates do not
/// extend the streak but still count towards the level.
pub fn streak(notes: &[Note], today: NaiveDate) -> Streak {
    let dates: BTreeSet<NaiveDate> = notes.iter().filter_map(Note::parsed_date).collect();
    let yesterday = today.checked_sub_days(Days::new(1));

    let mut days = 0;
    let mut newest_first = dates.iter().rev();
    if let Some(&newest) = newest_first.next() {
        if newest == today || Some(newest) == yesterday {
            days = 1;
            let mut current = newest;
            for &d in newest_first {
                if (current - d).num_days() != 1 {
                    break;
                }
                days += 1;
                current = d;
            }
        }
    }

    let total = notes.len();
    Streak {
        days,
        level: total / NOTES_PER_LEVEL + 1,
        next_unlock: NOTES_PER_LEVEL - total % NOTES_PER_LEVEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carenote_core::MedicalEntities;
    use chrono::Utc;

    fn on(date: &str) -> Note {
        Note::document("x", MedicalEntities::default(), Utc::now()).with_date(date)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            streak(&[], day(10)),
            Streak { days: 0, level: 1, next_unlock: 5 }
        );
    }

    #[test]
    fn test_consecutive_days_with_duplicates() {
        let notes = vec![on("2025-06-08"), on("2025-06-09"), on("2025-06-09"), on("2025-06-10")];
        let s = streak(&notes, day(10));
        assert_eq!(s.days, 3);
        assert_eq!(s.level, 1);
        assert_eq!(s.next_unlock, 1);
    }

    #[test]
    fn test_streak_from_yesterday() {
        let notes = vec![on("2025-06-08"), on("2025-06-09")];
        assert_eq!(streak(&notes, day(10)).days, 2);
    }

    #[test]
    fn test_broken_streak() {
        let notes = vec![on("2025-06-05"), on("2025-06-10")];
        assert_eq!(streak(&notes, day(10)).days, 1);
        let stale = vec![on("2025-06-07"), on("2025-06-08")];
        assert_eq!(streak(&stale, day(10)).days, 0);
    }

    #[test]
    fn test_bad_dates_count_for_level_only() {
        let notes: Vec<Note> = (0..5).map(|_| on("n/a")).collect();
        let s = streak(&notes, day(10));
        assert_eq!(s, Streak { days: 0, level: 2, next_unlock: 5 });
    }
}
