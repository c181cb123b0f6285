//! Tray command: progress through the current tray and manual advance.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::{TrayConfig, TrayProgress, UserId};
use aligner_db::Database;

use super::format::progress_bar;
use super::util::{load_tracker, save_tracker};

pub fn format_tray(tray: &TrayConfig, progress: &TrayProgress) -> String {
    let mut output = String::new();
    writeln!(output, "Tray {} of {}", tray.current_tray, tray.total_trays).unwrap();
    writeln!(
        output,
        "Day {} of {}  [{}] {:.0}%",
        progress.days_elapsed,
        tray.days_per_tray,
        progress_bar(progress.progress_percent),
        progress.progress_percent
    )
    .unwrap();

    if progress.overdue {
        let past = progress.days_elapsed - i64::from(tray.days_per_tray);
        let days = if past == 1 { "day" } else { "days" };
        writeln!(
            output,
            "Worn {past} {days} past target, run `aligner tray advance` when you switch"
        )
        .unwrap();
    } else {
        let days = if progress.days_remaining == 1 { "day" } else { "days" };
        writeln!(output, "{} {days} remaining", progress.days_remaining).unwrap();
    }
    output
}

pub fn format_advanced(tray: &TrayConfig) -> String {
    let mut output = String::new();
    writeln!(output, "Started tray {} of {}", tray.current_tray, tray.total_trays).unwrap();
    writeln!(
        output,
        "Time for progress photos: aligner photo add --kind front --image <path>"
    )
    .unwrap();
    output
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    advance: bool,
) -> Result<()> {
    let mut tracker = load_tracker(db, user, tz, now)?;

    if advance {
        let tray = tracker.advance_tray(now).clone();
        save_tracker(db, &tracker)?;
        write!(writer, "{}", format_advanced(&tray))?;
    } else {
        let progress = tracker.tray_progress(now);
        write!(writer, "{}", format_tray(tracker.tray(), &progress))?;
    }
    Ok(())
}
