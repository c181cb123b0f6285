//! Command-line argument definitions.

use std::path::PathBuf;

use aligner_core::{PhotoKind, RemovalReason};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Aligner wear tracker.
///
/// Logs when a clear aligner is in or out, totals daily wear against a goal,
/// and follows progress through the tray sequence.
#[derive(Debug, Parser)]
#[command(name = "aligner", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the current state and today's totals.
    Status,

    /// Put the aligner in or take it out.
    Toggle {
        /// Why it is coming out: eating, brushing, sports or other.
        #[arg(short, long, value_parser = parse_reason)]
        reason: Option<RemovalReason>,

        /// Free-text note attached to the new entry.
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Show one day's totals and timeline.
    Day {
        /// Local date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the last seven days.
    Week {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a month calendar of daily compliance.
    Month {
        /// Month to show (YYYY-MM). Defaults to the current month.
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },

    /// Show tray progress, or advance to the next tray.
    Tray {
        #[command(subcommand)]
        action: Option<TrayAction>,
    },

    /// Set the daily wear goal in hours.
    Goal {
        /// Hours per day, greater than 0 and at most 24.
        hours: f64,
    },

    /// Show current settings.
    Settings,

    /// Record or list progress photos.
    #[command(subcommand)]
    Photo(PhotoAction),

    /// Fill an empty account with a month of sample data.
    Demo,
}

/// Tray subcommands.
#[derive(Debug, Subcommand)]
pub enum TrayAction {
    /// Start the next tray now.
    Advance,
}

/// Photo subcommands.
#[derive(Debug, Subcommand)]
pub enum PhotoAction {
    /// Record a photo taken now with the current tray.
    Add {
        /// View shown: front, upper or lower.
        #[arg(long, value_parser = parse_photo_kind)]
        kind: PhotoKind,

        /// Path or URL of the image.
        #[arg(long)]
        image: String,
    },

    /// List recorded photos.
    List,
}

fn parse_reason(s: &str) -> Result<RemovalReason, String> {
    s.to_ascii_uppercase().parse().map_err(|_| {
        format!("unknown reason '{s}', expected one of: eating, brushing, sports, other")
    })
}

fn parse_photo_kind(s: &str) -> Result<PhotoKind, String> {
    s.to_ascii_uppercase()
        .parse()
        .map_err(|_| format!("unknown photo kind '{s}', expected one of: front, upper, lower"))
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("invalid month '{s}', expected YYYY-MM");
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
