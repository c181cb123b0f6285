//! Week command: the trailing seven days against the goal.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use aligner_core::compliance::goal_progress;
use aligner_core::{Compliance, UserId, WeeklySummary};
use aligner_db::Database;

use super::format::{format_duration, format_hours, progress_bar};
use super::util::{load_tracker, timezone_name};

pub fn format_week(week: &WeeklySummary, goal_hours: f64) -> String {
    let mut output = String::new();

    if let Some(last) = week.days.last() {
        writeln!(output, "Week ending {}", last.date.format("%A %Y-%m-%d")).unwrap();
    }
    for day in &week.days {
        let percent = goal_progress(day.totals.wear_ms, goal_hours).percent;
        writeln!(
            output,
            "  {}  [{}]  {:>7}  {}",
            day.date.format("%a %m-%d"),
            progress_bar(percent),
            format_duration(day.totals.wear_ms),
            day.compliance.as_str()
        )
        .unwrap();
    }
    writeln!(
        output,
        "Average: {} per day",
        format_hours(week.average_wear_hours)
    )
    .unwrap();
    writeln!(
        output,
        "Goal met: {} of {} days ({:.0}%)",
        week.met_days,
        week.days.len(),
        week.compliance_rate * 100.0
    )
    .unwrap();
    output
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonWeek<'a> {
    timezone: &'a str,
    goal_hours: f64,
    days: Vec<JsonDay>,
    met_days: usize,
    compliance_rate: f64,
    average_wear_hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDay {
    date: NaiveDate,
    wear_ms: i64,
    removed_ms: i64,
    removal_count: usize,
    compliance: Compliance,
}

pub fn format_week_json(week: &WeeklySummary, goal_hours: f64, timezone: &str) -> Result<String> {
    let report = JsonWeek {
        timezone,
        goal_hours,
        days: week
            .days
            .iter()
            .map(|day| JsonDay {
                date: day.date,
                wear_ms: day.totals.wear_ms,
                removed_ms: day.totals.removed_ms,
                removal_count: day.totals.removal_count,
                compliance: day.compliance,
            })
            .collect(),
        met_days: week.met_days,
        compliance_rate: week.compliance_rate,
        average_wear_hours: week.average_wear_hours,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let tracker = load_tracker(db, user, tz, now)?;
    let week = tracker.weekly_summary(now);
    let goal_hours = tracker.settings().daily_goal_hours;

    if json {
        writeln!(writer, "{}", format_week_json(&week, goal_hours, &timezone_name())?)?;
    } else {
        write!(writer, "{}", format_week(&week, goal_hours))?;
    }
    Ok(())
}
