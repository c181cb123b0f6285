//! The append-only wear log.
//!
//! A [`WearLog`] is an ordered sequence of [`LogEntry`] intervals. Only the
//! last entry may be open, and the only mutations are [`WearLog::append`] and
//! [`WearLog::close_last`]. Entries are never edited otherwise or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{EntryId, RemovalReason, ValidationError, WearStatus};

/// One contiguous interval of a single status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,

    /// Inclusive start of the interval.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,

    /// Exclusive end of the interval, or `None` while it is still running.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,

    /// Whether the appliance was in or out.
    pub status: WearStatus,

    /// Why the appliance was out. Only meaningful for [`WearStatus::Removed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RemovalReason>,

    /// Free text, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LogEntry {
    /// Creates a new open entry starting at `start`.
    ///
    /// A reason given for a wearing entry is discarded.
    pub fn open(status: WearStatus, reason: Option<RemovalReason>, start: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(),
            start_time: start,
            end_time: None,
            status,
            reason: match status {
                WearStatus::Wearing => None,
                WearStatus::Removed => reason,
            },
            note: None,
        }
    }

    /// Attaches a note.
    #[must_use]
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Returns true if the entry has no end yet.
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// The end used for computation: the recorded end, or `now` while open.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end_time.unwrap_or(now)
    }

    /// Full length of the entry in milliseconds, resolved at `now`.
    ///
    /// Never negative, even if `now` precedes the start.
    pub fn duration_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.effective_end(now) - self.start_time)
            .num_milliseconds()
            .max(0)
    }

    /// The reason used for aggregation. A removal without one counts as "other".
    pub fn effective_reason(&self) -> RemovalReason {
        self.reason.unwrap_or(RemovalReason::Other)
    }

    /// Checks the per-entry invariants.
    fn validate(&self) -> Result<()> {
        let start_ms = self.start_time.timestamp_millis();
        if start_ms < 0 {
            return Err(ValidationError::NegativeTimestamp { value_ms: start_ms }.into());
        }
        if let Some(end) = self.end_time {
            if end <= self.start_time {
                return Err(Error::NonMonotonicTime {
                    start: self.start_time,
                    end,
                });
            }
        }
        Ok(())
    }
}

/// Ordered sequence of wear intervals for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WearLog {
    entries: Vec<LogEntry>,
}

impl WearLog {
    /// Creates an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuilds a log from stored entries.
    ///
    /// Entries are ordered by start time. Gaps and overlaps between entries
    /// are accepted since they can come from clock changes or imports, but an
    /// open entry anywhere other than last is rejected.
    pub fn from_entries(mut entries: Vec<LogEntry>) -> Result<Self> {
        for entry in &entries {
            entry.validate()?;
        }
        entries.sort_by_key(|entry| entry.start_time);

        let open_before_last = entries
            .iter()
            .rev()
            .skip(1)
            .any(LogEntry::is_open);
        if open_before_last {
            return Err(Error::InvalidSequence {
                reason: "only the last entry may be open",
            });
        }

        Ok(Self { entries })
    }

    /// Appends an entry after the current last one.
    ///
    /// The current last entry must already be closed, and the new entry must
    /// not start before it ends.
    pub fn append(&mut self, entry: LogEntry) -> Result<()> {
        entry.validate()?;

        if let Some(last) = self.entries.last() {
            match last.end_time {
                None => {
                    return Err(Error::InvalidSequence {
                        reason: "the last entry is still open",
                    });
                }
                Some(end) if entry.start_time < end => {
                    return Err(Error::InvalidSequence {
                        reason: "entry starts before the previous entry ends",
                    });
                }
                Some(_) => {}
            }
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Closes the open last entry at `end`.
    pub fn close_last(&mut self, end: DateTime<Utc>) -> Result<()> {
        let last = self
            .entries
            .last_mut()
            .filter(|entry| entry.is_open())
            .ok_or(Error::NoOpenEntry)?;

        if end <= last.start_time {
            return Err(Error::NonMonotonicTime {
                start: last.start_time,
                end,
            });
        }

        last.end_time = Some(end);
        Ok(())
    }

    /// Borrowed view of all entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Owned copy of all entries.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// The open entry, if the log has one.
    pub fn open_entry(&self) -> Option<&LogEntry> {
        self.entries.last().filter(|entry| entry.is_open())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
