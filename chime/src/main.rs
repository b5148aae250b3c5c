/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

mod render;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::Parser;
use tracing::{error, info, warn};

use chime_core::resolver::ScheduleResolver;
use chime_core::timetable::{Timetable, TimetableParams};

// ── CLI argument definition ───────────────────────────────────────────────────

/// chime – terminal class-schedule display.
///
/// Example:
///   chime --timetable timetable.yaml
///   chime --once --date 2024-10-12 --time 09:20
#[derive(Debug, Parser)]
#[command(
    name = "chime",
    about = "Daily class-schedule display – shows the active lesson and its progress",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML timetable parameter file.
    #[arg(short = 'c', long = "timetable")]
    timetable: Option<PathBuf>,

    /// Refresh interval in seconds.
    #[arg(short = 'i', long = "interval", default_value_t = 1)]
    interval_secs: u64,

    /// Render a single snapshot and exit.
    #[arg(long = "once", default_value_t = false)]
    once: bool,

    /// Resolve this date instead of today (YYYY-MM-DD).  Most useful
    /// together with --once.
    #[arg(long = "date")]
    date: Option<NaiveDate>,

    /// Resolve this wall-clock time instead of now (HH:MM or HH:MM:SS).
    #[arg(long = "time", value_parser = parse_clock)]
    time: Option<NaiveTime>,
}

fn parse_clock(text: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text, "%H:%M").or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        timetable     = ?cli.timetable,
        interval_secs = cli.interval_secs,
        once          = cli.once,
        "Configuration"
    );

    // ── Build the timetable (once, at startup) ────────────────────────────────
    let timetable = match &cli.timetable {
        Some(path) => match Timetable::load_from_file(path) {
            Ok(table) => table,
            Err(e) => {
                error!("Failed to load timetable: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No timetable file provided, using built-in defaults");
            match Timetable::from_params(&TimetableParams::default()) {
                Ok(table) => table,
                Err(e) => {
                    error!("Built-in timetable failed validation: {:#}", e);
                    process::exit(1);
                }
            }
        }
    };

    let resolver = ScheduleResolver::new(Arc::new(timetable));

    // ── Refresh loop ──────────────────────────────────────────────────────────
    // One snapshot per tick; the resolver is pure, so all state lives here.
    // The local clock stands in for the caller-resolved timezone.
    let mut ticker = tokio::time::interval(Duration::from_secs(cli.interval_secs.max(1)));

    loop {
        ticker.tick().await;

        let now = Local::now();
        let date = cli.date.unwrap_or_else(|| now.date_naive());
        let time = cli.time.unwrap_or_else(|| now.time());

        let snapshot = resolver.snapshot(date, time);
        println!("{}", render::render_snapshot(&snapshot, time));

        if cli.once {
            break;
        }
    }
}
