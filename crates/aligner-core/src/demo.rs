//! Sample data for trying the tracker without a month of real use.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use crate::calendar::{local_date, local_instant, trailing_days};
use crate::error::Result;
use crate::log::{LogEntry, WearLog};
use crate::settings::Settings;
use crate::tracker::UserRecords;
use crate::tray::TrayConfig;
use crate::types::{RemovalReason, WearStatus};

/// Days of history generated, including today.
pub const DEMO_DAYS: u32 = 31;

/// Wear and meal blocks of a demo day, as minutes from its 08:00 start.
/// The final wear block runs until the next day's start.
const SCHEDULE: [(WearStatus, i64); 6] = [
    (WearStatus::Wearing, 270),
    (WearStatus::Removed, 15),
    (WearStatus::Wearing, 300),
    (WearStatus::Removed, 25),
    (WearStatus::Wearing, 360),
    (WearStatus::Removed, 35),
];

/// Generates a month of demo records ending at `now`.
///
/// Nothing is placed at or after `now`; the most recent entry is left open.
pub fn generate<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Result<UserRecords> {
    let day_start = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
    let starts: Vec<DateTime<Utc>> = trailing_days(local_date(now, tz), DEMO_DAYS)
        .into_iter()
        .map(|date| local_instant(date, day_start, tz))
        .collect();

    let mut entries = Vec::new();
    for (index, start) in starts.iter().enumerate() {
        let mut cursor = *start;
        for (status, minutes) in SCHEDULE {
            let end = cursor + Duration::minutes(minutes);
            entries.push(block(status, cursor, end));
            cursor = end;
        }
        let next_start = starts
            .get(index + 1)
            .copied()
            .unwrap_or_else(|| *start + Duration::days(1));
        entries.push(block(WearStatus::Wearing, cursor, next_start));
    }

    entries.retain(|entry| entry.start_time < now);
    if let Some(last) = entries.last_mut() {
        last.end_time = None;
    }

    let tray = TrayConfig::new(12, 40, 10, now - Duration::days(5))?;

    tracing::info!(entries = entries.len(), "generated demo records");
    Ok(UserRecords {
        log: WearLog::from_entries(entries)?,
        tray,
        settings: Settings::default(),
    })
}

fn block(status: WearStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> LogEntry {
    let reason = match status {
        WearStatus::Wearing => None,
        WearStatus::Removed => Some(RemovalReason::Eating),
    };
    LogEntry {
        end_time: Some(end),
        ..LogEntry::open(status, reason, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::{Compliance, weekly_summary};
    use crate::state::current_state;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 31, 14, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn nothing_lies_in_the_future() {
        let records = generate(now(), &Utc).unwrap();
        let entries = records.log.entries();

        assert!(entries.iter().all(|entry| entry.start_time < now()));
        assert!(entries.iter().rev().skip(1).all(|entry| !entry.is_open()));
        assert!(entries.last().unwrap().is_open());
    }

    #[test]
    fn log_is_contiguous() {
        let records = generate(now(), &Utc).unwrap();
        for pair in records.log.entries().windows(2) {
            assert_eq!(pair[0].end_time, Some(pair[1].start_time));
        }
    }

    #[test]
    fn afternoon_state_is_wearing_after_lunch() {
        // Second wear block runs 12:45 to 17:45.
        let records = generate(now(), &Utc).unwrap();
        let state = current_state(&records.log);
        assert_eq!(state.status, WearStatus::Wearing);
        assert_eq!(
            state.since,
            Some(Utc.with_ymd_and_hms(2025, 3, 31, 12, 45, 0).unwrap())
        );
    }

    #[test]
    fn past_days_meet_the_default_goal() {
        let records = generate(now(), &Utc).unwrap();
        let week = weekly_summary(
            records.log.entries(),
            local_date(now(), &Utc),
            &Utc,
            records.settings.daily_goal_hours,
            now(),
        );
        // Past days wear 22h45 counting the previous evening's tail.
        assert!(
            week.days[..6]
                .iter()
                .all(|day| day.compliance == Compliance::Met)
        );
        assert_eq!(week.days[6].compliance, Compliance::Below);
    }

    #[test]
    fn tray_started_five_days_ago() {
        let records = generate(now(), &Utc).unwrap();
        assert_eq!(records.tray.current_tray, 12);
        assert_eq!(records.tray.total_trays, 40);
        assert_eq!(records.tray.progress(now()).days_elapsed, 5);
    }
}
