//! CLI subcommand implementations.

pub mod day;
pub mod demo;
pub mod format;
pub mod month;
pub mod photo;
pub mod settings;
pub mod status;
pub mod toggle;
pub mod tray;
pub mod util;
pub mod week;
