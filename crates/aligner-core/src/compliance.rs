//! Daily and weekly compliance against the wear goal.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::aggregate::{Aggregate, Window, aggregate, aggregate_each};
use crate::calendar::{day_window, trailing_days};
use crate::log::LogEntry;

/// Width of the near-miss band below the goal, in hours.
pub const CLOSE_BAND_HOURS: f64 = 2.0;

/// Days in the trailing compliance window.
pub const WEEK_DAYS: u32 = 7;

/// How a day measured up to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compliance {
    /// Goal reached.
    Met,
    /// Within the near-miss band below the goal.
    Close,
    /// Some wear, but short of the band.
    Below,
    /// No wear recorded.
    None,
    /// The day has not begun yet.
    NotStarted,
}

impl Compliance {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Met => "MET",
            Self::Close => "CLOSE",
            Self::Below => "BELOW",
            Self::None => "NONE",
            Self::NotStarted => "NOT_STARTED",
        }
    }
}

/// Classifies a day's worn hours against the goal.
pub fn classify(wear_hours: f64, goal_hours: f64) -> Compliance {
    if wear_hours >= goal_hours {
        Compliance::Met
    } else if wear_hours <= 0.0 {
        Compliance::None
    } else if wear_hours >= goal_hours - CLOSE_BAND_HOURS {
        Compliance::Close
    } else {
        Compliance::Below
    }
}

/// Classifies the day bucket starting at `day_start`.
///
/// A day starting after `now` is [`Compliance::NotStarted`] rather than a failure.
pub fn daily_compliance(
    entries: &[LogEntry],
    day_start: DateTime<Utc>,
    goal_hours: f64,
    now: DateTime<Utc>,
) -> Compliance {
    if day_start > now {
        return Compliance::NotStarted;
    }
    let totals = aggregate(entries, Window::day(day_start), now);
    classify(totals.wear_hours(), goal_hours)
}

/// Progress toward the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_ms: i64,
    /// Worn time still needed, never negative.
    pub remaining_ms: i64,
    /// Share of the goal reached, capped at 100.
    pub percent: f64,
}

/// Computes progress of `wear_ms` toward a goal of `goal_hours`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn goal_progress(wear_ms: i64, goal_hours: f64) -> GoalProgress {
    let goal_ms = (goal_hours * 3_600_000.0).round() as i64;
    let percent = if goal_ms > 0 {
        (wear_ms as f64 / goal_ms as f64 * 100.0).min(100.0)
    } else {
        100.0
    };
    GoalProgress {
        goal_ms,
        remaining_ms: (goal_ms - wear_ms).max(0),
        percent,
    }
}

/// One day of a summary series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub window: Window,
    pub totals: Aggregate,
    pub compliance: Compliance,
}

impl DaySummary {
    fn new(date: NaiveDate, window: Window, totals: Aggregate, goal_hours: f64, now: DateTime<Utc>) -> Self {
        let compliance = if window.start > now {
            Compliance::NotStarted
        } else {
            classify(totals.wear_hours(), goal_hours)
        };
        Self {
            date,
            window,
            totals,
            compliance,
        }
    }
}

/// Summarizes one local day bucket.
pub fn summarize_day<Tz: TimeZone>(
    entries: &[LogEntry],
    date: NaiveDate,
    tz: &Tz,
    goal_hours: f64,
    now: DateTime<Utc>,
) -> DaySummary {
    let window = day_window(date, tz);
    let totals = aggregate(entries, window, now);
    DaySummary::new(date, window, totals, goal_hours, now)
}

/// Summarizes each of `dates` as a local day bucket.
pub fn summarize_days<Tz: TimeZone>(
    entries: &[LogEntry],
    dates: &[NaiveDate],
    tz: &Tz,
    goal_hours: f64,
    now: DateTime<Utc>,
) -> Vec<DaySummary> {
    let windows: Vec<Window> = dates.iter().map(|date| day_window(*date, tz)).collect();
    let totals = aggregate_each(entries, &windows, now);

    dates
        .iter()
        .zip(windows)
        .zip(totals)
        .map(|((date, window), totals)| DaySummary::new(*date, window, totals, goal_hours, now))
        .collect()
}

/// The trailing seven days ending today.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Oldest day first.
    pub days: Vec<DaySummary>,
    pub met_days: usize,
    /// Share of the seven days that met the goal, in [0, 1].
    pub compliance_rate: f64,
    /// Mean worn hours per day across the seven days.
    pub average_wear_hours: f64,
}

/// Summarizes the seven days ending with `today`.
#[allow(clippy::cast_precision_loss)]
pub fn weekly_summary<Tz: TimeZone>(
    entries: &[LogEntry],
    today: NaiveDate,
    tz: &Tz,
    goal_hours: f64,
    now: DateTime<Utc>,
) -> WeeklySummary {
    let dates = trailing_days(today, WEEK_DAYS);
    let days = summarize_days(entries, &dates, tz, goal_hours, now);

    let met_days = days
        .iter()
        .filter(|day| day.compliance == Compliance::Met)
        .count();
    let total_hours: f64 = days.iter().map(|day| day.totals.wear_hours()).sum();
    let week = f64::from(WEEK_DAYS);

    WeeklySummary {
        days,
        met_days,
        compliance_rate: met_days as f64 / week,
        average_wear_hours: total_hours / week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WearStatus;
    use chrono::Duration;

    const HOUR_MS: i64 = 3_600_000;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("valid test date")
    }

    fn midnight(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, 0, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn wear(start: DateTime<Utc>, hours: i64) -> LogEntry {
        LogEntry {
            end_time: Some(start + Duration::milliseconds(hours * HOUR_MS)),
            ..LogEntry::open(WearStatus::Wearing, None, start)
        }
    }

    #[test]
    fn classification_bands() {
        assert_eq!(classify(22.0, 22.0), Compliance::Met);
        assert_eq!(classify(23.5, 22.0), Compliance::Met);
        assert_eq!(classify(21.0, 22.0), Compliance::Close);
        assert_eq!(classify(20.0, 22.0), Compliance::Close);
        assert_eq!(classify(19.99, 22.0), Compliance::Below);
        assert_eq!(classify(0.1, 22.0), Compliance::Below);
        assert_eq!(classify(0.0, 22.0), Compliance::None);
        assert_eq!(classify(0.0, 1.5), Compliance::None);
    }

    #[test]
    fn twenty_one_hours_against_twenty_two_is_close() {
        let log = vec![wear(midnight(10), 21)];
        let result = daily_compliance(&log, midnight(10), 22.0, midnight(12));
        assert_eq!(result, Compliance::Close);
    }

    #[test]
    fn future_day_is_not_started() {
        let log = vec![wear(midnight(10), 21)];
        let result = daily_compliance(&log, midnight(11), 22.0, midnight(10) + Duration::hours(5));
        assert_eq!(result, Compliance::NotStarted);

        let empty_past = daily_compliance(&log, midnight(5), 22.0, midnight(10));
        assert_eq!(empty_past, Compliance::None);
    }

    #[test]
    fn goal_progress_caps_and_clamps() {
        let progress = goal_progress(11 * HOUR_MS, 22.0);
        assert_eq!(progress.goal_ms, 22 * HOUR_MS);
        assert_eq!(progress.remaining_ms, 11 * HOUR_MS);
        assert!((progress.percent - 50.0).abs() < 1e-9);

        let over = goal_progress(23 * HOUR_MS, 22.0);
        assert_eq!(over.remaining_ms, 0);
        assert!((over.percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_summary_counts_met_days() {
        let log: Vec<LogEntry> = (1..=7)
            .map(|d| wear(midnight(d), if d % 2 == 0 { 23 } else { 12 }))
            .collect();
        let now = midnight(7) + Duration::hours(23);

        let summary = weekly_summary(&log, date(7), &Utc, 22.0, now);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0].date, date(1));
        assert_eq!(summary.met_days, 3);
        assert!((summary.compliance_rate - 3.0 / 7.0).abs() < 1e-9);
        assert!((summary.average_wear_hours - (3.0 * 23.0 + 4.0 * 12.0) / 7.0).abs() < 1e-9);
        assert_eq!(summary.days[1].compliance, Compliance::Met);
        assert_eq!(summary.days[0].compliance, Compliance::Below);
    }

    #[test]
    fn summarize_day_matches_series_entry() {
        let log = vec![wear(midnight(9) + Duration::hours(20), 10)];
        let now = midnight(11);
        let dates = [date(9), date(10), date(11)];
        let series = summarize_days(&log, &dates, &Utc, 22.0, now);

        for (date, expected) in dates.iter().zip(&series) {
            assert_eq!(&summarize_day(&log, *date, &Utc, 22.0, now), expected);
        }
        assert_eq!(series[1].totals.wear_ms, 6 * HOUR_MS);
        assert_eq!(series[2].compliance, Compliance::None);
    }

    #[test]
    fn summarize_days_marks_future_days() {
        let dates = [date(10), date(11)];
        let days = summarize_days(&[], &dates, &Utc, 22.0, midnight(10) + Duration::hours(1));
        assert_eq!(days[0].compliance, Compliance::None);
        assert_eq!(days[1].compliance, Compliance::NotStarted);
    }
}
