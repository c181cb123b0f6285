//! Day command: one local day's totals, classification and timeline.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use aligner_core::compliance::goal_progress;
use aligner_core::{Aggregate, Compliance, DayDetail, LogEntry, UserId, WearStatus};
use aligner_db::Database;

use super::format::{format_duration, format_hours};
use super::status::removals;
use super::util::{clock, load_tracker, timezone_name};

pub fn format_day<Tz: TimeZone>(detail: &DayDetail<'_>, goal_hours: f64, tz: &Tz) -> String {
    let mut output = String::new();
    let summary = &detail.summary;
    let totals = &summary.totals;

    writeln!(
        output,
        "{}: {}",
        summary.date.format("%A %Y-%m-%d"),
        summary.compliance.as_str()
    )
    .unwrap();
    writeln!(
        output,
        "Worn:     {} of {} goal ({:.1}%)",
        format_duration(totals.wear_ms),
        format_hours(goal_hours),
        goal_progress(totals.wear_ms, goal_hours).percent
    )
    .unwrap();
    writeln!(
        output,
        "Removed:  {} in {}",
        format_duration(totals.removed_ms),
        removals(totals.removal_count)
    )
    .unwrap();
    for (reason, ms) in &totals.removed_by_reason {
        let reason = reason.as_str().to_lowercase();
        writeln!(output, "  {reason:<9} {}", format_duration(*ms)).unwrap();
    }

    if detail.entries.is_empty() {
        writeln!(output, "No entries.").unwrap();
        return output;
    }

    writeln!(output, "Timeline:").unwrap();
    for item in &detail.entries {
        let entry = item.entry;
        let end = entry
            .end_time
            .map_or_else(|| "now".to_string(), |end| clock(end, tz));
        write!(
            output,
            "  {}-{end:<5}  {}  {}",
            clock(entry.start_time, tz),
            entry.status,
            format_duration(item.duration_ms)
        )
        .unwrap();
        if entry.status == WearStatus::Removed {
            write!(output, "  {}", entry.effective_reason().as_str().to_lowercase()).unwrap();
        }
        if let Some(note) = &entry.note {
            write!(output, "  \"{note}\"").unwrap();
        }
        writeln!(output).unwrap();
    }
    output
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDay<'a> {
    date: NaiveDate,
    timezone: &'a str,
    compliance: Compliance,
    goal_hours: f64,
    totals: &'a Aggregate,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEntry<'a> {
    #[serde(flatten)]
    entry: &'a LogEntry,
    duration_ms: i64,
    clipped_ms: i64,
}

pub fn format_day_json(detail: &DayDetail<'_>, goal_hours: f64, timezone: &str) -> Result<String> {
    let day = JsonDay {
        date: detail.summary.date,
        timezone,
        compliance: detail.summary.compliance,
        goal_hours,
        totals: &detail.summary.totals,
        entries: detail
            .entries
            .iter()
            .map(|item| JsonEntry {
                entry: item.entry,
                duration_ms: item.duration_ms,
                clipped_ms: item.clipped_ms,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&day)?)
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let tracker = load_tracker(db, user, tz, now)?;
    let date = date.unwrap_or_else(|| tracker.today(now));
    let detail = tracker.day_detail(date, now);
    let goal_hours = tracker.settings().daily_goal_hours;

    if json {
        writeln!(writer, "{}", format_day_json(&detail, goal_hours, &timezone_name())?)?;
    } else {
        write!(writer, "{}", format_day(&detail, goal_hours, tracker.tz()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use aligner_core::{RemovalReason, Tracker, UserRecords};
    use chrono::Duration;
    use insta::assert_snapshot;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("valid test date")
    }

    fn tracker() -> Tracker<Utc> {
        let mut tracker = Tracker::new(UserId::new("u1").unwrap(), UserRecords::new(ts(0)), Utc);
        tracker.toggle(None, None, ts(0)).unwrap();
        tracker
            .toggle(Some(RemovalReason::Eating), Some("pancakes".into()), ts(240))
            .unwrap();
        tracker.toggle(None, None, ts(270)).unwrap();
        tracker
    }

    #[test]
    fn day_in_progress() {
        let tracker = tracker();
        let detail = tracker.day_detail(date(10), ts(300));

        assert_snapshot!(format_day(&detail, 22.0, &Utc), @r#"
        Monday 2025-03-10: BELOW
        Worn:     4h 30m of 22.0h goal (20.5%)
        Removed:  30m in 1 removal
          eating    30m
        Timeline:
          07:00-11:00  WEARING  4h 0m
          11:00-11:30  REMOVED  30m  eating  "pancakes"
          11:30-now    WEARING  30m
        "#);
    }

    #[test]
    fn future_day_has_no_entries() {
        let tracker = tracker();
        let detail = tracker.day_detail(date(12), ts(300));

        assert_snapshot!(format_day(&detail, 22.0, &Utc), @r"
        Wednesday 2025-03-12: NOT_STARTED
        Worn:     0m of 22.0h goal (0.0%)
        Removed:  0m in 0 removals
        No entries.
        ");
    }

    #[test]
    fn json_includes_totals_and_entries() {
        let tracker = tracker();
        let detail = tracker.day_detail(date(10), ts(300));
        let json = format_day_json(&detail, 22.0, "UTC").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["date"], "2025-03-10");
        assert_eq!(value["compliance"], "BELOW");
        assert_eq!(value["totals"]["wearMs"], 16_200_000);
        assert_eq!(value["totals"]["removedByReason"]["EATING"], 1_800_000);
        assert_eq!(value["entries"].as_array().unwrap().len(), 3);
        assert_eq!(value["entries"][1]["status"], "REMOVED");
        assert_eq!(value["entries"][1]["note"], "pancakes");
        assert_eq!(value["entries"][2]["durationMs"], 1_800_000);
        assert!(value["entries"][2]["endTime"].is_null());
    }
}
