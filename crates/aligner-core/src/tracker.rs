//! Per-user facade over the core.
//!
//! A [`Tracker`] owns one user's records and exposes the read views and the
//! few mutations the presentation layer needs. Records are injected by the
//! caller and handed back for persistence; the tracker never touches storage.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::aggregate::{self, Aggregate, Window, WindowEntry};
use crate::calendar;
use crate::compliance::{self, Compliance, DaySummary, GoalProgress, WeeklySummary};
use crate::error::Result;
use crate::log::WearLog;
use crate::photo::{PhotoKind, PhotoRecord};
use crate::settings::Settings;
use crate::state::{self, CurrentState, Transition};
use crate::tray::{TrayConfig, TrayProgress};
use crate::types::{RemovalReason, UserId, ValidationError};

/// The named records stored for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecords {
    pub log: WearLog,
    pub tray: TrayConfig,
    pub settings: Settings,
}

impl UserRecords {
    /// Records of a fresh account created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            log: WearLog::new(),
            tray: TrayConfig::initial(now),
            settings: Settings::default(),
        }
    }
}

/// Today's running totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub totals: Aggregate,
    pub progress: GoalProgress,
    pub compliance: Compliance,
}

/// A day's summary plus the entries overlapping it.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDetail<'a> {
    pub summary: DaySummary,
    pub entries: Vec<WindowEntry<'a>>,
}

/// One user's tracker, with calendar days resolved in `Tz`.
#[derive(Debug, Clone)]
pub struct Tracker<Tz: TimeZone> {
    user: UserId,
    records: UserRecords,
    tz: Tz,
}

impl<Tz: TimeZone> Tracker<Tz> {
    pub const fn new(user: UserId, records: UserRecords, tz: Tz) -> Self {
        Self { user, records, tz }
    }

    pub const fn user(&self) -> &UserId {
        &self.user
    }

    pub const fn records(&self) -> &UserRecords {
        &self.records
    }

    pub fn into_records(self) -> UserRecords {
        self.records
    }

    pub const fn log(&self) -> &WearLog {
        &self.records.log
    }

    pub const fn tray(&self) -> &TrayConfig {
        &self.records.tray
    }

    pub const fn settings(&self) -> &Settings {
        &self.records.settings
    }

    pub const fn tz(&self) -> &Tz {
        &self.tz
    }

    /// The local calendar date at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        calendar::local_date(now, &self.tz)
    }

    /// The aggregation window of a local calendar day.
    pub fn day_window(&self, date: NaiveDate) -> Window {
        calendar::day_window(date, &self.tz)
    }

    // ========== Read views ==========

    pub fn current_state(&self) -> CurrentState {
        state::current_state(&self.records.log)
    }

    pub fn aggregate(&self, window: Window, now: DateTime<Utc>) -> Aggregate {
        aggregate::aggregate(self.records.log.entries(), window, now)
    }

    pub fn daily_compliance(
        &self,
        day_start: DateTime<Utc>,
        goal_hours: f64,
        now: DateTime<Utc>,
    ) -> Compliance {
        compliance::daily_compliance(self.records.log.entries(), day_start, goal_hours, now)
    }

    pub fn tray_progress(&self, now: DateTime<Utc>) -> TrayProgress {
        self.records.tray.progress(now)
    }

    /// Running totals for the local day containing `now`.
    pub fn today_summary(&self, now: DateTime<Utc>) -> TodaySummary {
        let date = self.today(now);
        let window = self.day_window(date);
        let totals = self.aggregate(window, now);
        let goal_hours = self.records.settings.daily_goal_hours;

        TodaySummary {
            date,
            progress: compliance::goal_progress(totals.wear_ms, goal_hours),
            compliance: compliance::classify(totals.wear_hours(), goal_hours),
            totals,
        }
    }

    /// Summary and timeline of one local day.
    pub fn day_detail(&self, date: NaiveDate, now: DateTime<Utc>) -> DayDetail<'_> {
        let entries = self.records.log.entries();
        let summary = compliance::summarize_day(
            entries,
            date,
            &self.tz,
            self.records.settings.daily_goal_hours,
            now,
        );

        DayDetail {
            entries: aggregate::entries_in_window(entries, summary.window, now),
            summary,
        }
    }

    /// The seven days ending today.
    pub fn weekly_summary(&self, now: DateTime<Utc>) -> WeeklySummary {
        compliance::weekly_summary(
            self.records.log.entries(),
            self.today(now),
            &self.tz,
            self.records.settings.daily_goal_hours,
            now,
        )
    }

    /// Every day of a calendar month, or `None` for a nonexistent month.
    pub fn month_summary(&self, year: i32, month: u32, now: DateTime<Utc>) -> Option<Vec<DaySummary>> {
        let dates = calendar::month_days(year, month)?;
        Some(compliance::summarize_days(
            self.records.log.entries(),
            &dates,
            &self.tz,
            self.records.settings.daily_goal_hours,
            now,
        ))
    }

    // ========== Mutations ==========

    /// Switches between wearing and removed.
    pub fn toggle(
        &mut self,
        reason: Option<RemovalReason>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        state::toggle(&mut self.records.log, reason, note, now)
    }

    /// Starts the next tray at `now`.
    pub fn advance_tray(&mut self, now: DateTime<Utc>) -> &TrayConfig {
        self.records.tray.advance(now);
        &self.records.tray
    }

    pub fn set_daily_goal(&mut self, hours: f64) -> Result<()> {
        self.records.settings.set_daily_goal(hours)
    }

    /// A photo record stamped with the current tray.
    pub fn capture_photo(
        &self,
        kind: PhotoKind,
        image_ref: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<PhotoRecord, ValidationError> {
        PhotoRecord::capture(kind, image_ref, &self.records.tray, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::WearStatus;
    use chrono::{Datelike, Duration};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn tracker() -> Tracker<Utc> {
        Tracker::new(UserId::new("u1").unwrap(), UserRecords::new(start()), Utc)
    }

    #[test]
    fn toggle_then_today_summary() {
        let mut tracker = tracker();
        tracker.toggle(None, None, start()).unwrap();
        tracker
            .toggle(Some(RemovalReason::Eating), None, start() + Duration::hours(4))
            .unwrap();

        let now = start() + Duration::hours(4) + Duration::minutes(30);
        let today = tracker.today_summary(now);
        assert_eq!(today.totals.wear_ms, 4 * 3_600_000);
        assert_eq!(today.totals.removed_ms, 30 * 60_000);
        assert_eq!(today.progress.remaining_ms, 18 * 3_600_000);
        assert_eq!(today.compliance, Compliance::Below);
        assert_eq!(tracker.current_state().status, WearStatus::Removed);
    }

    #[test]
    fn missing_reason_surfaces_and_keeps_log() {
        let mut tracker = tracker();
        tracker.toggle(None, None, start()).unwrap();
        let err = tracker
            .toggle(None, None, start() + Duration::hours(1))
            .unwrap_err();
        assert_eq!(err, Error::MissingReason);
        assert_eq!(tracker.log().len(), 1);
        assert_eq!(tracker.current_state().status, WearStatus::Wearing);
    }

    #[test]
    fn advance_tray_resets_progress() {
        let mut tracker = tracker();
        let later = start() + Duration::days(12);
        assert!(tracker.tray_progress(later).overdue);

        let tray = tracker.advance_tray(later);
        assert_eq!(tray.current_tray, 2);
        assert_eq!(tracker.tray_progress(later).days_elapsed, 1);
    }

    #[test]
    fn day_detail_lists_overlapping_entries() {
        let mut tracker = tracker();
        tracker.toggle(None, None, start()).unwrap();
        tracker
            .toggle(Some(RemovalReason::Brushing), None, start() + Duration::hours(2))
            .unwrap();
        tracker
            .toggle(None, None, start() + Duration::hours(2) + Duration::minutes(5))
            .unwrap();

        let now = start() + Duration::hours(3);
        let detail = tracker.day_detail(tracker.today(now), now);
        assert_eq!(detail.entries.len(), 3);
        assert_eq!(detail.summary.totals.removal_count, 1);
        assert_eq!(detail.entries[2].duration_ms, 55 * 60_000);
    }

    #[test]
    fn day_detail_agrees_with_month_summary() {
        let mut tracker = tracker();
        tracker.toggle(None, None, start()).unwrap();
        let now = start() + Duration::days(1) + Duration::hours(2);

        let days = tracker.month_summary(2025, 3, now).unwrap();
        for date in [tracker.today(start()), tracker.today(now)] {
            let detail = tracker.day_detail(date, now);
            let index = usize::try_from(date.day0()).unwrap();
            assert_eq!(detail.summary, days[index]);
        }

        let future = tracker.day_detail(tracker.today(now) + chrono::Days::new(1), now);
        assert_eq!(future.summary.compliance, Compliance::NotStarted);
        assert!(future.entries.is_empty());
    }

    #[test]
    fn month_summary_covers_every_day() {
        let tracker = tracker();
        let days = tracker.month_summary(2025, 3, start()).unwrap();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0].compliance, Compliance::None);
        assert_eq!(days[30].compliance, Compliance::NotStarted);
        assert!(tracker.month_summary(2025, 0, start()).is_none());
    }

    #[test]
    fn photo_is_stamped_with_current_tray() {
        let mut tracker = tracker();
        tracker.advance_tray(start());
        let photo = tracker
            .capture_photo(PhotoKind::Front, "img-1", start())
            .unwrap();
        assert_eq!(photo.tray_number, 2);
    }

    #[test]
    fn set_daily_goal_validates() {
        let mut tracker = tracker();
        assert!(matches!(
            tracker.set_daily_goal(30.0),
            Err(Error::InvalidGoal { .. })
        ));
        tracker.set_daily_goal(20.0).unwrap();
        assert!((tracker.settings().daily_goal_hours - 20.0).abs() < f64::EPSILON);
    }
}
