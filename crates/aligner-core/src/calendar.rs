//! Local calendar days mapped onto aggregation windows.
//!
//! A day bucket starts at local midnight and lasts exactly 24 hours.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::aggregate::Window;

/// Converts local midnight of `date` in `tz` to UTC.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN, tz)
}

/// Converts a local wall-clock time on `date` in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. A time
/// skipped by a DST spring-forward resolves to one hour later.
pub fn local_instant<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let local = date.and_time(time);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// The aggregation window for a local calendar day.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Window {
    Window::day(local_midnight(date, tz))
}

/// The local calendar date `instant` falls on.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// The `count` days ending with `today`, oldest first.
pub fn trailing_days(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
        .collect()
}

/// Every day of a calendar month, or `None` if the month does not exist.
pub fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|day| day.month() == month)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).expect("valid test time")
    }

    /// A zone whose offset changes from `before` to `after` at `switch`.
    #[derive(Debug, Clone, Copy)]
    struct SwitchingZone {
        before: FixedOffset,
        after: FixedOffset,
        switch: NaiveDateTime,
    }

    impl SwitchingZone {
        fn west(before_hours: i32, after_hours: i32, switch: NaiveDateTime) -> Self {
            Self {
                before: FixedOffset::west_opt(before_hours * 3600).unwrap(),
                after: FixedOffset::west_opt(after_hours * 3600).unwrap(),
                switch,
            }
        }
    }

    impl TimeZone for SwitchingZone {
        type Offset = FixedOffset;

        fn from_offset(offset: &FixedOffset) -> Self {
            Self {
                before: *offset,
                after: *offset,
                switch: NaiveDateTime::MIN,
            }
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let valid = |offset: FixedOffset| {
                let utc = *local - Duration::seconds(i64::from(offset.local_minus_utc()));
                self.offset_from_utc_datetime(&utc) == offset
            };
            // The pre-switch reading of a repeated hour is the earlier instant.
            match (valid(self.before), valid(self.after)) {
                (true, true) if self.before != self.after => {
                    LocalResult::Ambiguous(self.before, self.after)
                }
                (true, _) => LocalResult::Single(self.before),
                (false, true) => LocalResult::Single(self.after),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < self.switch {
                self.before
            } else {
                self.after
            }
        }
    }

    #[test]
    fn skipped_midnight_resolves_to_one_am() {
        // Clocks jump from 00:00 at UTC-4 to 01:00 at UTC-3.
        let tz = SwitchingZone::west(4, 3, utc(2024, 9, 8, 4));
        assert!(matches!(
            tz.from_local_datetime(&utc(2024, 9, 8, 0)),
            LocalResult::None
        ));

        let window = day_window(date(2024, 9, 8), &tz);
        assert_eq!(window.start.to_rfc3339(), "2024-09-08T04:00:00+00:00");
        assert_eq!(
            window.start.with_timezone(&tz).naive_local(),
            utc(2024, 9, 8, 1)
        );
        assert_eq!(window.duration_ms(), 86_400_000);
    }

    #[test]
    fn repeated_midnight_resolves_to_earlier_instant() {
        // Clocks go back from 01:00 at UTC-3 to 00:00 at UTC-4.
        let tz = SwitchingZone::west(3, 4, utc(2025, 4, 6, 4));
        assert!(matches!(
            tz.from_local_datetime(&utc(2025, 4, 6, 0)),
            LocalResult::Ambiguous(..)
        ));

        let window = day_window(date(2025, 4, 6), &tz);
        assert_eq!(window.start.to_rfc3339(), "2025-04-06T03:00:00+00:00");
        assert_eq!(window.duration_ms(), 86_400_000);
        assert_eq!(local_date(window.start, &tz), date(2025, 4, 6));
    }

    #[test]
    fn ordinary_days_in_switching_zone_are_unaffected() {
        let tz = SwitchingZone::west(4, 3, utc(2024, 9, 8, 4));
        assert_eq!(
            local_midnight(date(2024, 9, 7), &tz).to_rfc3339(),
            "2024-09-07T04:00:00+00:00"
        );
        assert_eq!(
            local_midnight(date(2024, 9, 9), &tz).to_rfc3339(),
            "2024-09-09T03:00:00+00:00"
        );
    }

    #[test]
    fn day_window_starts_at_local_midnight() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let window = day_window(date(2025, 3, 10), &tz);

        assert_eq!(window.start.to_rfc3339(), "2025-03-09T16:00:00+00:00");
        assert_eq!(window.duration_ms(), 86_400_000);
    }

    #[test]
    fn local_date_uses_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(local_date(instant, &tz), date(2025, 3, 9));
    }

    #[test]
    fn trailing_days_is_oldest_first_and_inclusive() {
        let days = trailing_days(date(2025, 3, 2), 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2025, 2, 24));
        assert_eq!(days[6], date(2025, 3, 2));
    }

    #[test]
    fn month_days_handles_leap_years() {
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2025, 2).unwrap().len(), 28);
        assert_eq!(month_days(2025, 12).unwrap().len(), 31);
        assert!(month_days(2025, 13).is_none());
    }
}
