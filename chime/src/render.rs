/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Plain-text rendering of a schedule snapshot.
//!
//! Pure string building only; the caller decides where the text goes.
//! The active lesson row is extended with a progress bar and the
//! elapsed/remaining minute counts.

use chrono::NaiveTime;

use chime_core::lesson::Lesson;
use chime_core::resolver::ScheduleSnapshot;

/// Character width of the active-lesson progress bar.
const BAR_WIDTH: usize = 24;

/// Render the full snapshot: a header line followed by one row per lesson.
pub fn render_snapshot(snapshot: &ScheduleSnapshot, now: NaiveTime) -> String {
    let mut out = format!(
        "schedule {}/{}  now {}\n",
        snapshot.variant,
        snapshot.day_type,
        now.format("%H:%M:%S"),
    );

    if snapshot.lessons.is_empty() {
        out.push_str("  (no lessons scheduled)\n");
        return out;
    }

    for (index, lesson) in snapshot.lessons.iter().enumerate() {
        let active = snapshot.active_index == Some(index);
        out.push_str(&lesson_row(index, lesson, active, now));
        out.push('\n');
    }

    out
}

/// One display row.  Inactive lessons show only their interval; the active
/// lesson also gets the bar and minute counts.
fn lesson_row(index: usize, lesson: &Lesson, active: bool, now: NaiveTime) -> String {
    let marker = if active { '>' } else { ' ' };
    let mut row = format!(
        "{marker} {}. {} — {}",
        index + 1,
        lesson.start().format("%H:%M"),
        lesson.end().format("%H:%M"),
    );

    if active {
        let progress = lesson.progress(now);
        row.push_str(&format!(
            "  [{}] {:>3.0}%  {} min in, {} min left",
            progress_bar(progress, BAR_WIDTH),
            progress * 100.0,
            lesson.elapsed_minutes(now),
            lesson.remaining_minutes(now),
        ));
    }

    row
}

/// Fixed-width bar: `fraction` of `width` cells filled, clamped to `[0, 1]`.
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width * '█'.len_utf8());
    for cell in 0..width {
        bar.push(if cell < filled { '█' } else { '░' });
    }
    bar
}

// ── Tests ─────────────────────────────────────────────────────────────────────
