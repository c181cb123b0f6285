//! Settings and goal commands.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::{Settings, UserId};
use aligner_db::Database;

use super::format::format_hours;
use super::util::{load_tracker, save_tracker};

pub fn format_settings(settings: &Settings) -> String {
    let mut output = String::new();
    let notifications = if settings.notifications_enabled { "on" } else { "off" };
    let reminders: Vec<String> = settings
        .reminder_intervals
        .iter()
        .map(ToString::to_string)
        .collect();

    writeln!(output, "Daily goal:       {}", format_hours(settings.daily_goal_hours)).unwrap();
    writeln!(output, "Notifications:    {notifications}").unwrap();
    writeln!(output, "Reminders (min):  {}", reminders.join(", ")).unwrap();
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, user: &UserId) -> Result<()> {
    let settings = db
        .load_settings(user)
        .context("failed to load settings")?
        .unwrap_or_default();
    write!(writer, "{}", format_settings(&settings))?;
    Ok(())
}

/// Sets the daily wear goal.
pub fn run_goal<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    hours: f64,
) -> Result<()> {
    let mut tracker = load_tracker(db, user, tz, now)?;
    tracker
        .set_daily_goal(hours)
        .context("cannot set daily goal")?;
    save_tracker(db, &tracker)?;

    writeln!(writer, "Daily goal set to {}", format_hours(hours))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn default_settings() {
        assert_snapshot!(format_settings(&Settings::default()), @r"
        Daily goal:       22.0h
        Notifications:    on
        Reminders (min):  5, 15, 30, 60, 90, 120
        ");
    }

    #[test]
    fn goal_is_validated_and_persisted() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("aligner.db")).unwrap();
        let user = UserId::new("u1").unwrap();
        let now = Utc
            .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp");

        let mut output = Vec::new();
        let err = run_goal(&mut output, &mut db, &user, Utc, now, 25.0).unwrap_err();
        assert!(format!("{err:#}").contains("daily goal must be within (0, 24] hours"));
        assert_eq!(db.load_settings(&user).unwrap(), Some(Settings::default()));

        run_goal(&mut output, &mut db, &user, Utc, now, 20.5).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Daily goal set to 20.5h\n");

        let mut shown = Vec::new();
        run(&mut shown, &db, &user).unwrap();
        assert!(String::from_utf8(shown).unwrap().starts_with("Daily goal:       20.5h\n"));
    }
}
