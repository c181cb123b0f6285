//! Photo commands: record and list progress photo metadata.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use aligner_core::{PhotoKind, PhotoRecord, UserId};
use aligner_db::Database;

use super::util::{load_tracker, local_time};

pub fn format_photos<Tz: TimeZone>(photos: &[PhotoRecord], tz: &Tz) -> String {
    let mut output = String::new();
    if photos.is_empty() {
        writeln!(output, "No photos recorded.").unwrap();
        return output;
    }
    for photo in photos {
        writeln!(
            output,
            "{}  tray {:<3} {:<5}  {}",
            local_time(photo.taken_at, tz).format("%Y-%m-%d %H:%M"),
            photo.tray_number,
            photo.kind.as_str().to_lowercase(),
            photo.image_ref
        )
        .unwrap();
    }
    output
}

pub fn run_add<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    tz: Tz,
    now: DateTime<Utc>,
    kind: PhotoKind,
    image: &str,
) -> Result<()> {
    let tracker = load_tracker(db, user, tz, now)?;
    let photo = tracker
        .capture_photo(kind, image, now)
        .context("cannot record photo")?;
    db.insert_photo(user, &photo)
        .context("failed to save photo")?;

    writeln!(
        writer,
        "Recorded {} photo for tray {}",
        kind.as_str().to_lowercase(),
        photo.tray_number
    )?;
    Ok(())
}

pub fn run_list<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    tz: &Tz,
) -> Result<()> {
    let photos = db.list_photos(user).context("failed to list photos")?;
    write!(writer, "{}", format_photos(&photos, tz))?;
    Ok(())
}
