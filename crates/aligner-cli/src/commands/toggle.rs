//! Toggle command: switch between wearing and removed.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::{RemovalReason, Transition, UserId, WearStatus};
use aligner_db::Database;

use super::format::format_duration;
use super::util::{clock, load_tracker, save_tracker};

pub fn format_transition<Tz: TimeZone>(transition: &Transition, tz: &Tz) -> String {
    let mut output = String::new();
    let opened = &transition.opened;

    if let Some(closed) = &transition.closed {
        writeln!(
            output,
            "Ended {} after {}",
            closed.status,
            format_duration(closed.duration_ms(opened.start_time))
        )
        .unwrap();
    }

    match opened.status {
        WearStatus::Wearing => {
            writeln!(output, "Aligner in at {}", clock(opened.start_time, tz)).unwrap();
        }
        WearStatus::Removed => {
            let reason = opened.effective_reason().as_str().to_lowercase();
            writeln!(
                output,
                "Aligner out at {} for {reason}",
                clock(opened.start_time, tz)
            )
            .unwrap();
        }
    }
    output
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    reason: Option<RemovalReason>,
    note: Option<String>,
) -> Result<()> {
    let mut tracker = load_tracker(db, user, tz, now)?;
    let transition = tracker
        .toggle(reason, note, now)
        .context("cannot toggle; pass --reason when taking the aligner out")?;
    save_tracker(db, &tracker)?;

    write!(writer, "{}", format_transition(&transition, tracker.tz()))?;
    Ok(())
}
