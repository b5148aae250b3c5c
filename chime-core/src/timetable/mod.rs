//! Timetable construction, configuration, and lookup.
//!
//! The [`Timetable`] is the fixed mapping from (schedule variant × day type)
//! to an ordered lesson list.  It is built **once at process start**, from
//! the built-in defaults or from a YAML parameter file, validated in full,
//! and never mutated afterwards.  Every query on a constructed table is
//! infallible.
//!
//! Lesson lists are not written out lesson-by-lesson: each day is generated
//! from a compact parameter set.  A lesson is a *pair* of two teaching
//! segments split by a fixed short break, and consecutive lessons are
//! separated by per-day gap lists:
//!
//! ```text
//! day_start ──►│ seg 1 │break│ seg 2 │◄─ gap ─►│ seg 1 │break│ seg 2 │ ...
//!              └────── lesson 0 ─────┘         └────── lesson 1 ─────┘
//! ```
//!
//! The expected YAML structure (every field optional, defaults shown):
//! ```yaml
//! day_start: "09:00"
//! break_minutes: 5
//! long:
//!   first_part_minutes: 45
//!   second_part_minutes: 45
//! short:
//!   first_part_minutes: 40
//!   second_part_minutes: 40
//! weekday_gaps: [10, 20, 20, 10, 5]
//! saturday_gaps: [10, 10, 10, 10, 10]
//! ```

pub mod error;

pub use error::TimetableError;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::lesson::Lesson;

// ── Schedule keys ─────────────────────────────────────────────────────────────

/// Seasonal schedule regime, selected purely from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleVariant {
    /// September–November and April–June: full-length lesson segments.
    Long,
    /// December–March: shortened winter segments.
    Short,
}

impl std::fmt::Display for ScheduleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleVariant::Long => write!(f, "long"),
            ScheduleVariant::Short => write!(f, "short"),
        }
    }
}

/// Which of the two daily lesson patterns applies.
///
/// Sunday carries no pattern of its own and resolves to [`Weekday`];
/// see [`day_type_for`](crate::resolver::day_type_for).
///
/// [`Weekday`]: DayType::Weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Saturday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "weekday"),
            DayType::Saturday => write!(f, "saturday"),
        }
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// This is kept private – callers work with [`TimetableParams`] /
/// [`Timetable`] instead.  Every field is optional so that partial configs
/// are accepted gracefully (missing values fall back to the built-in
/// defaults).
#[derive(Debug, Deserialize)]
struct TimetableFile {
    #[serde(default = "default_day_start_text")]
    day_start: String,
    #[serde(default = "default_break_minutes")]
    break_minutes: u32,
    #[serde(default = "default_long_segments")]
    long: SegmentEntry,
    #[serde(default = "default_short_segments")]
    short: SegmentEntry,
    #[serde(default = "default_weekday_gaps")]
    weekday_gaps: Vec<u32>,
    #[serde(default = "default_saturday_gaps")]
    saturday_gaps: Vec<u32>,
}

/// Per-variant segment lengths as they appear in the YAML file.
#[derive(Debug, Deserialize)]
struct SegmentEntry {
    first_part_minutes: u32,
    second_part_minutes: u32,
}

fn default_day_start_text() -> String {
    String::from("09:00")
}

fn default_break_minutes() -> u32 {
    5
}

fn default_long_segments() -> SegmentEntry {
    SegmentEntry {
        first_part_minutes: 45,
        second_part_minutes: 45,
    }
}

fn default_short_segments() -> SegmentEntry {
    SegmentEntry {
        first_part_minutes: 40,
        second_part_minutes: 40,
    }
}

fn default_weekday_gaps() -> Vec<u32> {
    vec![10, 20, 20, 10, 5]
}

fn default_saturday_gaps() -> Vec<u32> {
    vec![10; 5]
}

// ── Public parameter set ──────────────────────────────────────────────────────

/// Teaching-segment lengths for one schedule variant, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLengths {
    pub first_part_minutes: u32,
    pub second_part_minutes: u32,
}

/// The validated parameter set a [`Timetable`] is generated from.
///
/// `Default` yields the built-in schedule: lessons from 09:00, a 5-minute
/// mid-lesson break, 45+45-minute segments in the long season and
/// 40+40-minute segments in the short season, six lessons per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableParams {
    /// Start of the first lesson.
    pub day_start: NaiveTime,

    /// Mid-lesson break length.  `0` disables the break subdivision
    /// entirely (lessons become single unbroken intervals).
    pub break_minutes: u32,

    /// Segment lengths for the long (Sep–Nov, Apr–Jun) variant.
    pub long: SegmentLengths,

    /// Segment lengths for the short (Dec–Mar) variant.
    pub short: SegmentLengths,

    /// Gaps between consecutive weekday lessons.  The list length fixes
    /// the lesson count at `len() + 1`.
    pub weekday_gaps: Vec<u32>,

    /// Gaps between consecutive Saturday lessons.
    pub saturday_gaps: Vec<u32>,
}

impl Default for TimetableParams {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
            break_minutes: 5,
            long: SegmentLengths {
                first_part_minutes: 45,
                second_part_minutes: 45,
            },
            short: SegmentLengths {
                first_part_minutes: 40,
                second_part_minutes: 40,
            },
            weekday_gaps: default_weekday_gaps(),
            saturday_gaps: default_saturday_gaps(),
        }
    }
}

// ── Timetable ─────────────────────────────────────────────────────────────────

/// Immutable mapping from (variant × day type) to an ordered lesson list.
///
/// All four combinations are materialised as fields, so
/// [`lessons`](Self::lessons) is a total lookup: there is no "missing
/// entry" case to defend against at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    long_weekday: Vec<Lesson>,
    long_saturday: Vec<Lesson>,
    short_weekday: Vec<Lesson>,
    short_saturday: Vec<Lesson>,
}

impl Timetable {
    /// Assemble a timetable from four explicit lesson lists.
    ///
    /// # Errors
    /// [`TimetableError::Unordered`] if any list is not strictly increasing
    /// in start time or contains overlapping intervals.  Per-lesson
    /// invariants were already enforced by the [`Lesson`] constructors.
    pub fn new(
        long_weekday: Vec<Lesson>,
        long_saturday: Vec<Lesson>,
        short_weekday: Vec<Lesson>,
        short_saturday: Vec<Lesson>,
    ) -> Result<Self, TimetableError> {
        let lists = [
            ("long/weekday", &long_weekday),
            ("long/saturday", &long_saturday),
            ("short/weekday", &short_weekday),
            ("short/saturday", &short_saturday),
        ];
        for (label, list) in lists {
            validate_ordering(label, list)?;
        }
        Ok(Self {
            long_weekday,
            long_saturday,
            short_weekday,
            short_saturday,
        })
    }

    /// Generate the four lesson lists from `params` and assemble the table.
    ///
    /// # Errors
    /// * [`TimetableError::ZeroSegment`] — a variant configured a
    ///   zero-length teaching segment.
    /// * [`TimetableError::CrossesMidnight`] — a generated lesson or gap
    ///   ran past 24:00.
    pub fn from_params(params: &TimetableParams) -> Result<Self, TimetableError> {
        for (label, seg) in [("long", params.long), ("short", params.short)] {
            if seg.first_part_minutes == 0 || seg.second_part_minutes == 0 {
                return Err(TimetableError::ZeroSegment {
                    variant: label.to_string(),
                    first: seg.first_part_minutes,
                    second: seg.second_part_minutes,
                });
            }
        }

        let long_weekday = build_day(
            "long/weekday",
            params.day_start,
            params.long,
            params.break_minutes,
            &params.weekday_gaps,
        )?;
        let long_saturday = build_day(
            "long/saturday",
            params.day_start,
            params.long,
            params.break_minutes,
            &params.saturday_gaps,
        )?;
        let short_weekday = build_day(
            "short/weekday",
            params.day_start,
            params.short,
            params.break_minutes,
            &params.weekday_gaps,
        )?;
        let short_saturday = build_day(
            "short/saturday",
            params.day_start,
            params.short,
            params.break_minutes,
            &params.saturday_gaps,
        )?;

        Self::new(long_weekday, long_saturday, short_weekday, short_saturday)
    }

    /// Parse `path` as a YAML parameter file and build the timetable.
    ///
    /// Missing fields fall back to the built-in defaults, so a file
    /// overriding only `break_minutes` is valid.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, `day_start` does not parse as `HH:MM`, or the
    /// resulting parameters fail timetable validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading timetable parameters from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open timetable file: {}", path.display()))?;

        let file: TimetableFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let day_start = parse_day_start(&file.day_start)
            .with_context(|| format!("Invalid day_start '{}'", file.day_start))?;

        let params = TimetableParams {
            day_start,
            break_minutes: file.break_minutes,
            long: SegmentLengths {
                first_part_minutes: file.long.first_part_minutes,
                second_part_minutes: file.long.second_part_minutes,
            },
            short: SegmentLengths {
                first_part_minutes: file.short.first_part_minutes,
                second_part_minutes: file.short.second_part_minutes,
            },
            weekday_gaps: file.weekday_gaps,
            saturday_gaps: file.saturday_gaps,
        };

        debug!(
            day_start = %params.day_start,
            break_minutes = params.break_minutes,
            weekday_lessons = params.weekday_gaps.len() + 1,
            saturday_lessons = params.saturday_gaps.len() + 1,
            "parsed timetable parameters"
        );

        let table = Self::from_params(&params)
            .with_context(|| format!("Timetable in {} failed validation", path.display()))?;

        info!(
            "Loaded timetable: {} weekday / {} saturday lesson(s) per day",
            table.long_weekday.len(),
            table.long_saturday.len(),
        );

        Ok(table)
    }

    /// Ordered lesson list for a (variant × day type) combination.
    ///
    /// Pure lookup: the sequence is returned unmodified, and the call never
    /// fails; every combination is materialised at construction.
    pub fn lessons(&self, variant: ScheduleVariant, day_type: DayType) -> &[Lesson] {
        match (variant, day_type) {
            (ScheduleVariant::Long, DayType::Weekday) => &self.long_weekday,
            (ScheduleVariant::Long, DayType::Saturday) => &self.long_saturday,
            (ScheduleVariant::Short, DayType::Weekday) => &self.short_weekday,
            (ScheduleVariant::Short, DayType::Saturday) => &self.short_saturday,
        }
    }
}

// ── Generation helpers ────────────────────────────────────────────────────────

/// Parse `HH:MM` (or `HH:MM:SS`) into a `NaiveTime`.
fn parse_day_start(text: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
}

/// Advance `time` by `minutes`, failing if the result would wrap past
/// midnight.
fn advance(
    list: &str,
    index: usize,
    time: NaiveTime,
    minutes: u32,
) -> Result<NaiveTime, TimetableError> {
    let (next, wrap) = time.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    if wrap != 0 {
        return Err(TimetableError::CrossesMidnight {
            list: list.to_string(),
            index,
        });
    }
    Ok(next)
}

/// Generate one day's lesson list: `gaps.len() + 1` paired lessons starting
/// at `day_start`, each `first + break + second` minutes long, separated by
/// the given gaps.
fn build_day(
    list: &str,
    day_start: NaiveTime,
    seg: SegmentLengths,
    break_minutes: u32,
    gaps: &[u32],
) -> Result<Vec<Lesson>, TimetableError> {
    let count = gaps.len() + 1;
    let mut lessons = Vec::with_capacity(count);
    let mut current = day_start;

    for index in 0..count {
        let break_start = advance(list, index, current, seg.first_part_minutes)?;
        let break_end = advance(list, index, break_start, break_minutes)?;
        let end = advance(list, index, break_end, seg.second_part_minutes)?;

        let lesson = if break_minutes == 0 {
            Lesson::new(current, end)
        } else {
            Lesson::with_break(current, break_start, break_end, end)
        };
        let lesson = lesson.map_err(|reason| TimetableError::InvalidLesson {
            list: list.to_string(),
            index,
            reason,
        })?;
        lessons.push(lesson);

        if index < gaps.len() {
            current = advance(list, index, end, gaps[index])?;
        }
    }

    Ok(lessons)
}

/// Require strictly increasing starts and non-overlapping intervals.
fn validate_ordering(list: &str, lessons: &[Lesson]) -> Result<(), TimetableError> {
    for (prev, pair) in lessons.windows(2).enumerate() {
        let ordered = pair[0].start() < pair[1].start() && pair[0].end() <= pair[1].start();
        if !ordered {
            return Err(TimetableError::Unordered {
                list: list.to_string(),
                prev,
                next: prev + 1,
            });
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn default_table() -> Timetable {
        Timetable::from_params(&TimetableParams::default()).unwrap()
    }

    // ── Built-in defaults ─────────────────────────────────────────────────────

    #[test]
    fn default_table_has_six_lessons_per_day() {
        let table = default_table();
        for variant in [ScheduleVariant::Long, ScheduleVariant::Short] {
            for day in [DayType::Weekday, DayType::Saturday] {
                assert_eq!(table.lessons(variant, day).len(), 6, "{variant}/{day}");
            }
        }
    }

    #[test]
    fn default_long_weekday_lessons_match_expected_times() {
        let table = default_table();
        let lessons = table.lessons(ScheduleVariant::Long, DayType::Weekday);
        let expected = [
            (t(9, 0), t(10, 35)),
            (t(10, 45), t(12, 20)),
            (t(12, 40), t(14, 15)),
            (t(14, 35), t(16, 10)),
            (t(16, 20), t(17, 55)),
            (t(18, 0), t(19, 35)),
        ];
        for (lesson, (start, end)) in lessons.iter().zip(expected) {
            assert_eq!(lesson.start(), start);
            assert_eq!(lesson.end(), end);
            assert_eq!(lesson.duration_minutes(), 95);
        }
    }

    #[test]
    fn default_short_weekday_lessons_are_85_minutes() {
        let table = default_table();
        let lessons = table.lessons(ScheduleVariant::Short, DayType::Weekday);
        assert_eq!(lessons[0].start(), t(9, 0));
        assert_eq!(lessons[0].end(), t(10, 25));
        assert_eq!(lessons[1].start(), t(10, 35));
        assert_eq!(lessons[5].end(), t(18, 35));
        for lesson in lessons {
            assert_eq!(lesson.duration_minutes(), 85);
        }
    }

    #[test]
    fn default_saturday_uses_uniform_ten_minute_gaps() {
        let table = default_table();
        let lessons = table.lessons(ScheduleVariant::Long, DayType::Saturday);
        for pair in lessons.windows(2) {
            assert_eq!((pair[1].start() - pair[0].end()).num_minutes(), 10);
        }
        assert_eq!(lessons[5].end(), t(19, 20));
    }

    #[test]
    fn default_lessons_carry_the_five_minute_break() {
        let table = default_table();
        let first = table.lessons(ScheduleVariant::Long, DayType::Weekday)[0];
        assert_eq!(first.break_start(), Some(t(9, 45)));
        assert_eq!(first.break_end(), Some(t(9, 50)));
        assert_eq!(first.break_duration_minutes(), Some(5));
    }

    // ── Generation edge cases ─────────────────────────────────────────────────

    #[test]
    fn zero_break_generates_unbroken_lessons() {
        let params = TimetableParams {
            break_minutes: 0,
            ..TimetableParams::default()
        };
        let table = Timetable::from_params(&params).unwrap();
        let first = table.lessons(ScheduleVariant::Long, DayType::Weekday)[0];
        assert_eq!(first.break_start(), None);
        assert_eq!(first.duration_minutes(), 90);
    }

    #[test]
    fn zero_segment_is_rejected() {
        let params = TimetableParams {
            long: SegmentLengths {
                first_part_minutes: 0,
                second_part_minutes: 45,
            },
            ..TimetableParams::default()
        };
        let err = Timetable::from_params(&params).unwrap_err();
        assert!(matches!(err, TimetableError::ZeroSegment { .. }));
    }

    #[test]
    fn day_running_past_midnight_is_rejected() {
        let params = TimetableParams {
            day_start: t(22, 0),
            ..TimetableParams::default()
        };
        let err = Timetable::from_params(&params).unwrap_err();
        assert!(matches!(err, TimetableError::CrossesMidnight { .. }));
    }

    #[test]
    fn empty_gap_list_yields_a_single_lesson() {
        let params = TimetableParams {
            weekday_gaps: vec![],
            saturday_gaps: vec![],
            ..TimetableParams::default()
        };
        let table = Timetable::from_params(&params).unwrap();
        assert_eq!(table.lessons(ScheduleVariant::Long, DayType::Weekday).len(), 1);
    }

    #[test]
    fn zero_gap_produces_back_to_back_lessons() {
        let params = TimetableParams {
            weekday_gaps: vec![0],
            ..TimetableParams::default()
        };
        let table = Timetable::from_params(&params).unwrap();
        let lessons = table.lessons(ScheduleVariant::Long, DayType::Weekday);
        assert_eq!(lessons[0].end(), lessons[1].start());
    }

    // ── Explicit construction ─────────────────────────────────────────────────

    #[test]
    fn new_rejects_overlapping_lessons() {
        let a = Lesson::new(t(9, 0), t(10, 0)).unwrap();
        let b = Lesson::new(t(9, 30), t(10, 30)).unwrap();
        let err = Timetable::new(vec![a, b], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, TimetableError::Unordered { prev: 0, next: 1, .. }));
    }

    #[test]
    fn new_rejects_out_of_order_lessons() {
        let a = Lesson::new(t(11, 0), t(12, 0)).unwrap();
        let b = Lesson::new(t(9, 0), t(10, 0)).unwrap();
        let err = Timetable::new(vec![], vec![a, b], vec![], vec![]).unwrap_err();
        assert!(matches!(err, TimetableError::Unordered { .. }));
    }

    #[test]
    fn new_accepts_empty_lists_and_lookup_returns_empty() {
        let table = Timetable::new(vec![], vec![], vec![], vec![]).unwrap();
        assert!(table
            .lessons(ScheduleVariant::Short, DayType::Saturday)
            .is_empty());
    }

    // ── YAML loading ──────────────────────────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
day_start: "08:30"
break_minutes: 10
long:
  first_part_minutes: 50
  second_part_minutes: 40
short:
  first_part_minutes: 35
  second_part_minutes: 35
weekday_gaps: [15, 15]
saturday_gaps: [20]
"#;
        let f = yaml_tempfile(yaml);
        let table = Timetable::load_from_file(f.path()).unwrap();

        let weekday = table.lessons(ScheduleVariant::Long, DayType::Weekday);
        assert_eq!(weekday.len(), 3);
        assert_eq!(weekday[0].start(), t(8, 30));
        // 50 + 10 + 40 = 100 minutes
        assert_eq!(weekday[0].end(), t(10, 10));
        assert_eq!(weekday[1].start(), t(10, 25));

        let saturday = table.lessons(ScheduleVariant::Short, DayType::Saturday);
        assert_eq!(saturday.len(), 2);
        // 35 + 10 + 35 = 80 minutes
        assert_eq!(saturday[0].end(), t(9, 50));
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let f = yaml_tempfile("break_minutes: 5\n");
        let table = Timetable::load_from_file(f.path()).unwrap();
        assert_eq!(table, default_table());
    }

    #[test]
    fn empty_yaml_mapping_equals_defaults() {
        let f = yaml_tempfile("{}\n");
        let table = Timetable::load_from_file(f.path()).unwrap();
        assert_eq!(table, default_table());
    }

    #[test]
    fn day_start_accepts_seconds_form() {
        let f = yaml_tempfile("day_start: \"09:00:00\"\n");
        let table = Timetable::load_from_file(f.path()).unwrap();
        assert_eq!(table, default_table());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = Timetable::load_from_file(Path::new("/nonexistent/timetable.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml:::");
        assert!(Timetable::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unparseable_day_start_returns_error() {
        let f = yaml_tempfile("day_start: \"nine o'clock\"\n");
        assert!(Timetable::load_from_file(f.path()).is_err());
    }

    #[test]
    fn invalid_parameters_in_yaml_are_rejected() {
        let yaml = r#"
long:
  first_part_minutes: 0
  second_part_minutes: 45
"#;
        let f = yaml_tempfile(yaml);
        assert!(Timetable::load_from_file(f.path()).is_err());
    }
}
