//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use aligner_core::{Tracker, UserId};
use aligner_db::Database;

/// Loads `user`'s records into a tracker resolving days in `tz`.
///
/// A new user's initial tray and settings are stored on first load.
pub fn load_tracker<Tz: TimeZone>(
    db: &Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Tracker<Tz>> {
    let records = db
        .ensure_records(user, now)
        .with_context(|| format!("failed to load records for user {user}"))?;
    Ok(Tracker::new(user.clone(), records, tz))
}

/// Writes every record of the tracker back to the database.
pub fn save_tracker<Tz: TimeZone>(db: &mut Database, tracker: &Tracker<Tz>) -> Result<()> {
    db.save_records(tracker.user(), tracker.records())
        .with_context(|| format!("failed to save records for user {}", tracker.user()))
}

/// Wall-clock time of `instant` in `tz`.
pub fn local_time<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// `HH:MM` of `instant` in `tz`.
pub fn clock<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    local_time(instant, tz).format("%H:%M").to_string()
}

/// Name of the system timezone, falling back to UTC.
pub fn timezone_name() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}
