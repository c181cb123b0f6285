//! Interval aggregation.
//!
//! Clips log entries against a half-open window `[start, end)` and sums the
//! clipped durations by status. Every calendar cell, day detail, trend bar
//! and "today" total is this same computation run over a different window.
//!
//! # Algorithm
//!
//! For each entry independently:
//! 1. Resolve the effective end (`end_time`, or `now` while open)
//! 2. Clip to the window: `max(start, window.start)` .. `min(end, window.end)`
//! 3. Add the clipped span to the entry's status total if it is positive
//!
//! No state is carried between entries, so gaps and overlaps in the log are
//! aggregated without special handling and an entry spanning midnight is
//! split across neighbouring day windows by construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::log::LogEntry;
use crate::types::{RemovalReason, WearStatus};

/// Milliseconds in one calendar-day bucket.
pub const DAY_MS: i64 = 86_400_000;

/// A half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24 hour bucket beginning at `start`.
    pub fn day(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + Duration::milliseconds(DAY_MS),
        }
    }

    /// Length of the window; zero for empty or inverted windows.
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds().max(0)
    }

    /// Returns true if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the overlap between `entry` and this window, resolved at `now`.
    fn clip_ms(&self, entry: &LogEntry, now: DateTime<Utc>) -> i64 {
        let clipped_start = entry.start_time.max(self.start);
        let clipped_end = entry.effective_end(now).min(self.end);
        (clipped_end - clipped_start).num_milliseconds().max(0)
    }
}

/// Totals for one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    /// Time worn within the window.
    pub wear_ms: i64,
    /// Time out within the window.
    pub removed_ms: i64,
    /// Time out, split by reason. Removals without a reason count as other.
    pub removed_by_reason: BTreeMap<RemovalReason, i64>,
    /// Number of removal entries overlapping the window.
    pub removal_count: usize,
}

impl Aggregate {
    /// Total time covered by entries within the window.
    pub const fn tracked_ms(&self) -> i64 {
        self.wear_ms + self.removed_ms
    }

    /// Worn time in fractional hours.
    #[allow(clippy::cast_precision_loss)]
    pub fn wear_hours(&self) -> f64 {
        self.wear_ms as f64 / 3_600_000.0
    }
}

/// An entry overlapping a window, with its durations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry<'a> {
    pub entry: &'a LogEntry,
    /// Length of the whole entry, not just the part inside the window.
    pub duration_ms: i64,
    /// Length of the part inside the window.
    pub clipped_ms: i64,
}

/// Sums the time attributable to each status within `window`.
///
/// `now` resolves open entries. Durations are never negative: a span that
/// clips to nothing contributes nothing.
pub fn aggregate(entries: &[LogEntry], window: Window, now: DateTime<Utc>) -> Aggregate {
    warn_open_after_now(entries, now);
    sum_window(entries, window, now)
}

/// Aggregates each window independently, returning results in window order.
///
/// Windows are evaluated in parallel over the shared, read-only entries.
pub fn aggregate_each(entries: &[LogEntry], windows: &[Window], now: DateTime<Utc>) -> Vec<Aggregate> {
    warn_open_after_now(entries, now);
    windows
        .par_iter()
        .map(|window| sum_window(entries, *window, now))
        .collect()
}

/// Reports a clock anomaly once per call rather than once per window.
fn warn_open_after_now(entries: &[LogEntry], now: DateTime<Utc>) {
    if let Some(entry) = entries
        .iter()
        .find(|entry| entry.is_open() && entry.start_time > now)
    {
        tracing::warn!(
            entry = %entry.id,
            start = %entry.start_time,
            %now,
            "open entry starts after now, ignoring"
        );
    }
}

fn sum_window(entries: &[LogEntry], window: Window, now: DateTime<Utc>) -> Aggregate {
    let mut totals = Aggregate::default();
    if window.duration_ms() == 0 {
        return totals;
    }

    for entry in entries {
        let clipped_ms = window.clip_ms(entry, now);
        if clipped_ms == 0 {
            continue;
        }

        match entry.status {
            WearStatus::Wearing => totals.wear_ms += clipped_ms,
            WearStatus::Removed => {
                totals.removed_ms += clipped_ms;
                *totals
                    .removed_by_reason
                    .entry(entry.effective_reason())
                    .or_insert(0) += clipped_ms;
                totals.removal_count += 1;
            }
        }
    }

    totals
}

/// Entries overlapping `window`, ordered by start time.
pub fn entries_in_window(
    entries: &[LogEntry],
    window: Window,
    now: DateTime<Utc>,
) -> Vec<WindowEntry<'_>> {
    let mut overlapping: Vec<WindowEntry<'_>> = entries
        .iter()
        .filter_map(|entry| {
            let clipped_ms = window.clip_ms(entry, now);
            (clipped_ms > 0).then(|| WindowEntry {
                entry,
                duration_ms: entry.duration_ms(now),
                clipped_ms,
            })
        })
        .collect();
    overlapping.sort_by_key(|item| item.entry.start_time);
    overlapping
}
