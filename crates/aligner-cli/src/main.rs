use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aligner_cli::commands::{day, demo, month, photo, settings, status, toggle, tray, week};
use aligner_cli::{Cli, Commands, Config, PhotoAction, TrayAction};
use aligner_core::UserId;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(aligner_db::Database, UserId)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = aligner_db::Database::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    let user = UserId::new(config.user).context("invalid user in configuration")?;
    Ok((db, user))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, user) = open_database(cli.config.as_deref())?;
    let now = Utc::now();
    let mut out = io::stdout().lock();

    match command {
        Commands::Status => status::run(&mut out, &db, &user, Local, now)?,
        Commands::Toggle { reason, note } => {
            toggle::run(&mut out, &mut db, &user, Local, now, reason, note)?;
        }
        Commands::Day { date, json } => day::run(&mut out, &db, &user, Local, now, date, json)?,
        Commands::Week { json } => week::run(&mut out, &db, &user, Local, now, json)?,
        Commands::Month { month } => month::run(&mut out, &db, &user, Local, now, month)?,
        Commands::Tray { action } => {
            let advance = matches!(action, Some(TrayAction::Advance));
            tray::run(&mut out, &mut db, &user, Local, now, advance)?;
        }
        Commands::Goal { hours } => {
            settings::run_goal(&mut out, &mut db, &user, Local, now, hours)?;
        }
        Commands::Settings => settings::run(&mut out, &db, &user)?,
        Commands::Photo(PhotoAction::Add { kind, image }) => {
            photo::run_add(&mut out, &mut db, &user, Local, now, kind, &image)?;
        }
        Commands::Photo(PhotoAction::List) => photo::run_list(&mut out, &db, &user, &Local)?,
        Commands::Demo => demo::run(&mut out, &mut db, &user, &Local, now)?,
    }

    Ok(())
}
