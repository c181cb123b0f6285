//! Month command: calendar of daily compliance.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Datelike, TimeZone, Utc};

use aligner_core::{Compliance, DaySummary, UserId};
use aligner_db::Database;

use super::util::load_tracker;

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

const fn symbol(compliance: Compliance) -> char {
    match compliance {
        Compliance::Met => '+',
        Compliance::Close => '~',
        Compliance::Below => '-',
        Compliance::None => '.',
        Compliance::NotStarted => ' ',
    }
}

/// Renders a Monday-first calendar. `days` must be one whole month.
pub fn format_month(days: &[DaySummary]) -> String {
    let mut output = String::new();
    let Some(first) = days.first() else {
        return output;
    };

    writeln!(output, "{}", first.date.format("%B %Y")).unwrap();
    let header: Vec<String> = WEEKDAYS.iter().map(|name| format!("{name:>3}")).collect();
    writeln!(output, "{}", header.join(" ")).unwrap();

    let blanks = first.date.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["   ".to_string(); blanks];
    cells.extend(
        days.iter()
            .map(|day| format!("{:>2}{}", day.date.day(), symbol(day.compliance))),
    );
    for week in cells.chunks(WEEKDAYS.len()) {
        writeln!(output, "{}", week.join(" ").trim_end()).unwrap();
    }

    let started: Vec<&DaySummary> = days
        .iter()
        .filter(|day| day.compliance != Compliance::NotStarted)
        .collect();
    let met = started
        .iter()
        .filter(|day| day.compliance == Compliance::Met)
        .count();
    writeln!(output, "Goal met on {met} of {} days", started.len()).unwrap();
    writeln!(output, "+ met  ~ close  - below  . none").unwrap();
    output
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    month: Option<(i32, u32)>,
) -> Result<()> {
    let tracker = load_tracker(db, user, tz, now)?;
    let (year, month) = month.unwrap_or_else(|| {
        let today = tracker.today(now);
        (today.year(), today.month())
    });
    let Some(days) = tracker.month_summary(year, month, now) else {
        bail!("no such month: {year}-{month:02}");
    };

    write!(writer, "{}", format_month(&days))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use aligner_core::{Tracker, demo};
    use insta::assert_snapshot;

    #[test]
    fn demo_month_calendar() {
        let now = Utc
            .with_ymd_and_hms(2025, 3, 20, 14, 0, 0)
            .single()
            .expect("valid test timestamp");
        let records = demo::generate(now, &Utc).unwrap();
        let tracker = Tracker::new(UserId::new("demo").unwrap(), records, Utc);
        let days = tracker.month_summary(2025, 3, now).unwrap();

        assert_snapshot!(format_month(&days), @r"
        March 2025
         Mo  Tu  We  Th  Fr  Sa  Su
                             1+  2+
         3+  4+  5+  6+  7+  8+  9+
        10+ 11+ 12+ 13+ 14+ 15+ 16+
        17+ 18+ 19+ 20- 21  22  23
        24  25  26  27  28  29  30
        31
        Goal met on 19 of 20 days
        + met  ~ close  - below  . none
        ");
    }

    #[test]
    fn run_defaults_to_current_month() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(&temp.path().join("aligner.db")).unwrap();
        let now = Utc
            .with_ymd_and_hms(2025, 2, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp");

        let mut output = Vec::new();
        run(&mut output, &db, &UserId::new("u1").unwrap(), Utc, now, None).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("February 2025\n"));
        assert!(output.contains("Goal met on 0 of 10 days"));
    }
}
