//! Errors raised by core operations.
//!
//! All of these are contract violations detected before any state is
//! written, so a failed call never leaves a half-applied mutation behind.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::ValidationError;

/// Core operation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Appending would break the ordering or openness invariants of the log.
    #[error("invalid log sequence: {reason}")]
    InvalidSequence { reason: &'static str },

    /// There is no open entry to close.
    #[error("no open entry to close")]
    NoOpenEntry,

    /// An end instant that is not after its start.
    #[error("end {end} is not after start {start}")]
    NonMonotonicTime {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Taking the appliance out requires a reason.
    #[error("a removal reason is required")]
    MissingReason,

    /// Daily goal outside (0, 24] hours.
    #[error("daily goal must be within (0, 24] hours, got {hours}")]
    InvalidGoal { hours: f64 },

    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
