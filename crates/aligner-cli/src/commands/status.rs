//! Status command: current state, today's totals and tray.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::{Tracker, UserId};
use aligner_db::Database;

use super::format::{format_duration, format_hours, progress_bar};
use super::util::{clock, load_tracker};

pub fn format_status<Tz: TimeZone>(tracker: &Tracker<Tz>, now: DateTime<Utc>) -> String {
    let mut output = String::new();

    let state = tracker.current_state();
    match state.since {
        Some(since) => writeln!(
            output,
            "Status:  {} for {} (since {})",
            state.status,
            format_duration(state.elapsed_ms(now)),
            clock(since, tracker.tz())
        )
        .unwrap(),
        None => writeln!(output, "Status:  {}, nothing logged yet", state.status).unwrap(),
    }

    let today = tracker.today_summary(now);
    writeln!(
        output,
        "Today:   {} worn, {} out ({})",
        format_duration(today.totals.wear_ms),
        format_duration(today.totals.removed_ms),
        removals(today.totals.removal_count)
    )
    .unwrap();

    let goal = format_hours(tracker.settings().daily_goal_hours);
    let bar = progress_bar(today.progress.percent);
    if today.progress.remaining_ms == 0 {
        writeln!(output, "Goal:    {goal} [{bar}] {:.1}%, met", today.progress.percent).unwrap();
    } else {
        writeln!(
            output,
            "Goal:    {goal} [{bar}] {:.1}%, {} to go",
            today.progress.percent,
            format_duration(today.progress.remaining_ms)
        )
        .unwrap();
    }

    output.push_str(&tray_line(tracker, now));
    output
}

/// One-line tray summary shared with the tray command.
pub fn tray_line<Tz: TimeZone>(tracker: &Tracker<Tz>, now: DateTime<Utc>) -> String {
    let tray = tracker.tray();
    let progress = tracker.tray_progress(now);
    let overdue = if progress.overdue { ", overdue" } else { "" };
    format!(
        "Tray:    {} of {}, day {} of {}{overdue}\n",
        tray.current_tray, tray.total_trays, progress.days_elapsed, tray.days_per_tray
    )
}

/// "1 removal", "3 removals".
pub fn removals(count: usize) -> String {
    if count == 1 {
        "1 removal".to_string()
    } else {
        format!("{count} removals")
    }
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<()> {
    let tracker = load_tracker(db, user, tz, now)?;
    write!(writer, "{}", format_status(&tracker, now))?;
    Ok(())
}
