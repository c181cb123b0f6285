//! The wear/removed state machine.
//!
//! State is derived from the log tail: an open last entry gives its status,
//! anything else means the appliance is out. A toggle closes the open entry
//! and opens one of the other status in a single step.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::log::{LogEntry, WearLog};
use crate::types::{RemovalReason, WearStatus};

/// The state implied by a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentState {
    pub status: WearStatus,
    /// When the current state began. `None` for an empty log.
    pub since: Option<DateTime<Utc>>,
}

impl CurrentState {
    /// Time spent in the current state so far.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        self.since
            .map_or(0, |since| (now - since).num_milliseconds().max(0))
    }
}

/// What a toggle did to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The entry that was closed, if one was open.
    pub closed: Option<LogEntry>,
    /// The newly opened entry.
    pub opened: LogEntry,
}

/// Derives the current state from the log tail.
pub fn current_state(log: &WearLog) -> CurrentState {
    match log.last() {
        None => CurrentState {
            status: WearStatus::Removed,
            since: None,
        },
        Some(last) => match last.end_time {
            None => CurrentState {
                status: last.status,
                since: Some(last.start_time),
            },
            Some(end) => CurrentState {
                status: WearStatus::Removed,
                since: Some(end),
            },
        },
    }
}

/// Switches between wearing and removed at `now`.
///
/// Going from wearing to removed requires a `reason`; a reason given when
/// putting the appliance back in is discarded. The log is only modified if
/// the whole transition succeeds.
pub fn toggle(
    log: &mut WearLog,
    reason: Option<RemovalReason>,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<Transition> {
    let from = current_state(log).status;
    let to = from.opposite();

    if to == WearStatus::Removed && reason.is_none() {
        return Err(Error::MissingReason);
    }

    let mut next = log.clone();
    let closed = if next.open_entry().is_some() {
        next.close_last(now)?;
        next.last().cloned()
    } else {
        None
    };

    let opened = LogEntry::open(to, reason, now).with_note(note);
    next.append(opened.clone())?;
    *log = next;

    tracing::debug!(%from, %to, entry = %opened.id, "toggled wear state");
    Ok(Transition { closed, opened })
}
