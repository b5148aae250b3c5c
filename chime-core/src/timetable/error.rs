/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for timetable construction.
//!
//! Two error layers model the two places a timetable can go wrong:
//!
//! * [`LessonError`](crate::lesson::LessonError) — why a single lesson was
//!   rejected (low-level, carries the exact times).
//! * [`TimetableError`] — top-level failure returned from
//!   [`Timetable::new`](super::Timetable::new) /
//!   [`Timetable::from_params`](super::Timetable::from_params).
//!
//! Construction is the **only** place these errors can occur: once a
//! [`Timetable`](super::Timetable) exists, every query on it is total.
//! **Do not** replace these with `anyhow::Error` inside the library — the
//! structured variants are intentional; the file-loading path wraps them
//! with `anyhow::Context` at the outermost layer only.

use thiserror::Error;

use crate::lesson::LessonError;

/// Top-level error for timetable construction.
///
/// `list` identifies the offending lesson list as `"variant/day_type"`
/// (e.g. `"long/weekday"`), so a startup log line pinpoints the bad entry
/// without further parsing.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// A teaching segment length of zero was configured.  Zero-length
    /// segments would collapse the lesson ordering invariant.
    #[error("'{variant}' segment lengths must be non-zero (first: {first} min, second: {second} min)")]
    ZeroSegment {
        variant: String,
        first: u32,
        second: u32,
    },

    /// A generated lesson would run past midnight.  Lessons are wall-clock
    /// intervals within one day; the timetable parameters must keep the
    /// whole day inside `00:00..24:00`.
    #[error("{list} lesson {index} would cross midnight")]
    CrossesMidnight { list: String, index: usize },

    /// An individual lesson violated its internal ordering invariant.
    #[error("{list} lesson {index}: {reason}")]
    InvalidLesson {
        list: String,
        index: usize,
        reason: LessonError,
    },

    /// Two consecutive lessons overlap or are not in increasing start
    /// order.
    #[error("{list} lessons {prev} and {next} overlap or are out of order")]
    Unordered {
        list: String,
        prev: usize,
        next: usize,
    },
}
