//! Aligner wear tracker CLI library.
//!
//! This crate provides the command-line presentation layer over
//! `aligner-core`, persisting through `aligner-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PhotoAction, TrayAction};
pub use config::Config;
