//! Tray (appliance stage) lifecycle.
//!
//! Trays only advance on explicit confirmation. Wearing a tray past its
//! target duration is a normal, displayed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DAY_MS;
use crate::types::ValidationError;

/// Trays in a fresh account's plan.
pub const INITIAL_TOTAL_TRAYS: u32 = 30;

/// Target days per tray in a fresh account.
pub const INITIAL_DAYS_PER_TRAY: u32 = 10;

/// Per-user tray configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrayConfig {
    /// 1-based ordinal of the tray being worn.
    pub current_tray: u32,
    /// Planned number of trays. Shown to the user, never enforced.
    pub total_trays: u32,
    /// Target wear duration of each tray.
    pub days_per_tray: u32,
    /// When the current tray was started.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
}

/// Derived progress through the current tray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrayProgress {
    /// Day number within the tray, starting at 1 on the start day.
    pub days_elapsed: i64,
    /// Share of the target duration reached, capped at 100.
    pub progress_percent: f64,
    pub days_remaining: i64,
    /// The target duration has been exceeded.
    pub overdue: bool,
}

impl TrayConfig {
    /// Creates a validated configuration.
    pub fn new(
        current_tray: u32,
        total_trays: u32,
        days_per_tray: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            current_tray,
            total_trays,
            days_per_tray,
            start_date,
        };
        config.validate()?;
        Ok(config)
    }

    /// The configuration of a fresh account, starting tray 1 at `now`.
    pub const fn initial(now: DateTime<Utc>) -> Self {
        Self {
            current_tray: 1,
            total_trays: INITIAL_TOTAL_TRAYS,
            days_per_tray: INITIAL_DAYS_PER_TRAY,
            start_date: now,
        }
    }

    /// Checks field invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.current_tray == 0 {
            return Err(ValidationError::ZeroTray);
        }
        if self.days_per_tray == 0 {
            return Err(ValidationError::ZeroDaysPerTray);
        }
        Ok(())
    }

    /// Progress through the current tray at `now`.
    ///
    /// The start day counts as day 1. A `now` before the start date is
    /// treated as the start day.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: DateTime<Utc>) -> TrayProgress {
        let elapsed_ms = (now - self.start_date).num_milliseconds();
        let days_elapsed = if elapsed_ms > 0 {
            (elapsed_ms + DAY_MS - 1) / DAY_MS
        } else {
            0
        }
        .max(1);

        let days_per_tray = i64::from(self.days_per_tray.max(1));
        let progress_percent = (100.0 * days_elapsed as f64 / days_per_tray as f64).min(100.0);

        TrayProgress {
            days_elapsed,
            progress_percent,
            days_remaining: (days_per_tray - days_elapsed).max(0),
            overdue: days_elapsed > days_per_tray,
        }
    }

    /// Moves on to the next tray, starting it at `now`.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        let next = self.current_tray.saturating_add(1);
        tracing::debug!(from = self.current_tray, to = next, "advanced tray");
        self.current_tray = next;
        self.start_date = now;
    }
}
