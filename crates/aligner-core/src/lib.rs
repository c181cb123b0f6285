//! Core domain logic for aligner wear tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - The wear log: an append-only sequence of wear/removal intervals
//! - Aggregation: clipping the log against time windows and summing by status
//! - State: deriving wearing/removed from the log and toggling between them
//! - Trays: progress through the current appliance stage
//! - Compliance: classifying days against the daily wear goal
//!
//! Everything here is pure and in-memory; persistence lives in `aligner-db`.

pub mod aggregate;
pub mod calendar;
pub mod compliance;
pub mod demo;
mod error;
pub mod log;
pub mod photo;
pub mod settings;
pub mod state;
mod tracker;
pub mod tray;
pub mod types;

pub use aggregate::{Aggregate, Window, WindowEntry, aggregate, aggregate_each, entries_in_window};
pub use compliance::{Compliance, DaySummary, GoalProgress, WeeklySummary};
pub use error::{Error, Result};
pub use log::{LogEntry, WearLog};
pub use photo::{PhotoKind, PhotoRecord};
pub use settings::Settings;
pub use state::{CurrentState, Transition};
pub use tracker::{DayDetail, TodaySummary, Tracker, UserRecords};
pub use tray::{TrayConfig, TrayProgress};
pub use types::{EntryId, PhotoId, RemovalReason, UserId, ValidationError, WearStatus};
