//! Demo command: seed a month of sample wear data into an account with no log.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::UserId;
use aligner_core::demo::{self, DEMO_DAYS};
use aligner_db::Database;

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<()> {
    if db.has_log(user).context("failed to check existing log")? {
        bail!("user {user} already has wear data; demo data is only added to empty accounts");
    }

    // Stored tray and settings belong to the user; only the log is seeded over them.
    let mut records = demo::generate(now, tz).context("failed to generate demo data")?;
    let mut kept = Vec::new();
    if let Some(tray) = db
        .load_tray_config(user)
        .context("failed to load tray configuration")?
    {
        records.tray = tray;
        kept.push("tray");
    }
    if let Some(settings) = db.load_settings(user).context("failed to load settings")? {
        records.settings = settings;
        kept.push("settings");
    }

    db.save_records(user, &records)
        .context("failed to save demo data")?;

    writeln!(
        writer,
        "Seeded {DEMO_DAYS} days of demo data ({} entries) for user {user}",
        records.log.len()
    )?;
    if !kept.is_empty() {
        writeln!(writer, "Kept existing {}", kept.join(" and "))?;
    }
    Ok(())
}
