//! Schedule resolution: from a calendar date and a wall-clock time to the
//! day's lesson list and the currently active lesson.
//!
//! [`ScheduleResolver`] is the sole entry point the display layer consumes.
//! Each call to [`snapshot`](ScheduleResolver::snapshot) resolves the
//! seasonal variant from the month, the day type from the day of week,
//! looks up the lesson list and computes the active index:
//!
//! ```text
//! date ──► variant_for_month ─┐
//!                             ├──► Timetable::lessons ──► active_lesson_index ──► ScheduleSnapshot
//! date ──► day_type_for ──────┘                              ▲
//!                                                    now ────┘
//! ```
//!
//! Every step is a stateless, total, pure function: same inputs always
//! produce the same output, nothing is stored between calls, and no input
//! has an error path: a time falling outside every lesson simply yields
//! `active_index == None`.  The resolver holds the timetable behind an
//! `Arc` and touches no mutable state, so it is `Send + Sync` and may be
//! queried concurrently from any number of callers.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use chrono::{NaiveDate, NaiveTime};
//! use chime_core::resolver::ScheduleResolver;
//! use chime_core::timetable::{Timetable, TimetableParams};
//!
//! let table = Timetable::from_params(&TimetableParams::default()).unwrap();
//! let resolver = ScheduleResolver::new(Arc::new(table));
//!
//! let date = NaiveDate::from_ymd_opt(2024, 10, 12).unwrap();
//! let now = NaiveTime::from_hms_opt(9, 20, 0).unwrap();
//! let snapshot = resolver.snapshot(date, now);
//! assert_eq!(snapshot.active_index, Some(0));
//! ```

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::lesson::Lesson;
use crate::timetable::{DayType, ScheduleVariant, Timetable};

// ── Pure resolution functions ─────────────────────────────────────────────────

/// Seasonal variant for a calendar month (1–12).
///
/// December, January, February and March use the short winter segments;
/// every other month uses the long segments.  Total for any input; values
/// outside 1–12 fall into the `Long` arm like any non-winter month.
pub fn variant_for_month(month: u32) -> ScheduleVariant {
    match month {
        12 | 1..=3 => ScheduleVariant::Short,
        _ => ScheduleVariant::Long,
    }
}

/// Day type for a calendar date.
///
/// Saturday has its own lesson pattern; every other day of the week,
/// Sunday included, resolves to the weekday pattern.
pub fn day_type_for(date: NaiveDate) -> DayType {
    if date.weekday() == Weekday::Sat {
        DayType::Saturday
    } else {
        DayType::Weekday
    }
}

/// Index of the lesson whose half-open interval contains `now`.
///
/// Returns `None` when `now` falls before the first lesson, in a gap
/// between lessons, or after the last one.  Lessons are non-overlapping by
/// construction, so at most one can match; the first match in sequence
/// order wins.
pub fn active_lesson_index(lessons: &[Lesson], now: NaiveTime) -> Option<usize> {
    lessons.iter().position(|lesson| lesson.contains(now))
}

// ── ScheduleSnapshot ──────────────────────────────────────────────────────────

/// The resolved schedule for one instant.
///
/// Computed fresh on every tick and owned entirely by the caller: `lessons`
/// are copies, so the snapshot stays consistent even if it outlives the
/// call.  Consumed by the display layer and discarded, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSnapshot {
    pub variant: ScheduleVariant,
    pub day_type: DayType,
    pub lessons: Vec<Lesson>,
    /// Position in `lessons` of the lesson containing the query time, or
    /// `None` if no lesson does.
    pub active_index: Option<usize>,
}

impl ScheduleSnapshot {
    /// The active lesson itself, if any.
    pub fn active_lesson(&self) -> Option<&Lesson> {
        self.active_index.and_then(|idx| self.lessons.get(idx))
    }
}

// ── ScheduleResolver ──────────────────────────────────────────────────────────

/// Resolves snapshots against a fixed [`Timetable`].
///
/// Holds a shared reference to the table; all per-call state lives on the
/// stack of [`snapshot`](Self::snapshot), so the resolver is `Send + Sync`
/// with no interior mutability.
#[derive(Debug, Clone)]
pub struct ScheduleResolver {
    timetable: Arc<Timetable>,
}

impl ScheduleResolver {
    /// Create a resolver backed by the given timetable.
    pub fn new(timetable: Arc<Timetable>) -> Self {
        Self { timetable }
    }

    /// Resolve the schedule for `date` at wall-clock time `now`.
    ///
    /// Idempotent and side-effect-free: the same `(date, now)` pair always
    /// yields the same snapshot.
    pub fn snapshot(&self, date: NaiveDate, now: NaiveTime) -> ScheduleSnapshot {
        let variant = variant_for_month(date.month());
        let day_type = day_type_for(date);
        let lessons = self.timetable.lessons(variant, day_type).to_vec();
        let active_index = active_lesson_index(&lessons, now);

        ScheduleSnapshot {
            variant,
            day_type,
            lessons,
            active_index,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
