//! User preferences consulted by compliance evaluation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ValidationError;

/// Default daily wear goal in hours.
pub const DEFAULT_DAILY_GOAL_HOURS: f64 = 22.0;

/// Default reminder offsets in minutes.
pub const DEFAULT_REMINDER_INTERVALS: [u32; 6] = [5, 15, 30, 60, 90, 120];

/// Per-user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Target worn hours per day, within (0, 24].
    pub daily_goal_hours: f64,
    pub notifications_enabled: bool,
    /// Minutes after removal at which to remind, strictly ascending.
    pub reminder_intervals: Vec<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal_hours: DEFAULT_DAILY_GOAL_HOURS,
            notifications_enabled: true,
            reminder_intervals: DEFAULT_REMINDER_INTERVALS.to_vec(),
        }
    }
}

impl Settings {
    /// Daily goal in milliseconds.
    #[allow(clippy::cast_possible_truncation)]
    pub fn daily_goal_ms(&self) -> i64 {
        (self.daily_goal_hours * 3_600_000.0).round() as i64
    }

    /// Replaces the daily goal.
    pub fn set_daily_goal(&mut self, hours: f64) -> Result<()> {
        validate_goal(hours)?;
        tracing::debug!(from = self.daily_goal_hours, to = hours, "daily goal changed");
        self.daily_goal_hours = hours;
        Ok(())
    }

    /// Replaces the reminder offsets.
    pub fn set_reminder_intervals(&mut self, intervals: Vec<u32>) -> Result<()> {
        validate_reminder_intervals(&intervals)?;
        self.reminder_intervals = intervals;
        Ok(())
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<()> {
        validate_goal(self.daily_goal_hours)?;
        validate_reminder_intervals(&self.reminder_intervals)
    }
}

fn validate_reminder_intervals(intervals: &[u32]) -> Result<()> {
    let ascending = intervals.first().is_none_or(|first| *first > 0)
        && intervals.windows(2).all(|pair| pair[0] < pair[1]);
    if !ascending {
        return Err(ValidationError::ReminderIntervals {
            intervals: intervals.to_vec(),
        }
        .into());
    }
    Ok(())
}

/// Accepts goals within (0, 24] hours.
pub fn validate_goal(hours: f64) -> Result<f64> {
    if hours.is_nan() || hours <= 0.0 || hours > 24.0 {
        return Err(Error::InvalidGoal { hours });
    }
    Ok(hours)
}
