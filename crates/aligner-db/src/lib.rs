//! Storage layer for aligner wear tracking.
//!
//! Persists each user's named records (wear log, tray configuration,
//! settings) and photo metadata using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Instants are stored as INTEGER milliseconds since the Unix epoch, the same
//! representation the core serializes. A `NULL` `end_ms` marks the open entry.
//!
//! ## Enumerations
//!
//! Status, reason and photo kind columns hold the uppercase names produced by
//! each type's `as_str`. Values that do not parse fail the load with
//! [`DbError::InvalidRecord`] rather than being guessed at.

use std::path::Path;
use std::str::FromStr;

use aligner_core::{
    EntryId, LogEntry, PhotoId, PhotoKind, PhotoRecord, RemovalReason, Settings, TrayConfig,
    UserId, UserRecords, WearLog, WearStatus,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row could not be turned back into a domain value.
    #[error("invalid {table} record {id}: {message}")]
    InvalidRecord {
        table: &'static str,
        id: String,
        message: String,
    },
    /// Stored entries do not form a valid wear log.
    #[error("invalid wear log: {0}")]
    Log(#[from] aligner_core::Error),
    /// Failed to encode or decode a JSON column.
    #[error("invalid json column: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One row per wear/removal interval
            -- status: 'WEARING' or 'REMOVED'
            -- reason: removal reason, NULL for wearing rows
            CREATE TABLE IF NOT EXISTS log_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                start_ms INTEGER NOT NULL,
                end_ms INTEGER,
                status TEXT NOT NULL,
                reason TEXT,
                note TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_log_entries_user_start ON log_entries(user_id, start_ms);

            CREATE TABLE IF NOT EXISTS tray_configs (
                user_id TEXT PRIMARY KEY,
                current_tray INTEGER NOT NULL,
                total_trays INTEGER NOT NULL,
                days_per_tray INTEGER NOT NULL,
                start_ms INTEGER NOT NULL
            );

            -- reminder_intervals: JSON array of minutes
            CREATE TABLE IF NOT EXISTS settings (
                user_id TEXT PRIMARY KEY,
                daily_goal_hours REAL NOT NULL,
                notifications_enabled INTEGER NOT NULL,
                reminder_intervals TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS photos (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                taken_ms INTEGER NOT NULL,
                kind TEXT NOT NULL,
                tray_number INTEGER NOT NULL,
                image_ref TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_photos_user_taken ON photos(user_id, taken_ms);
            ",
        )?;
        Ok(())
    }

    // ========== User records ==========

    /// Loads every named record for `user`.
    ///
    /// A missing tray configuration falls back to the initial one started at
    /// `now`; missing settings fall back to the defaults.
    pub fn load_records(&self, user: &UserId, now: DateTime<Utc>) -> Result<UserRecords, DbError> {
        let log = self.load_log(user)?;
        let tray = self
            .load_tray_config(user)?
            .unwrap_or_else(|| TrayConfig::initial(now));
        let settings = self.load_settings(user)?.unwrap_or_default();

        tracing::debug!(user = %user, entries = log.len(), "loaded records");
        Ok(UserRecords {
            log,
            tray,
            settings,
        })
    }

    /// Loads `user`'s records, first storing the initial tray configuration
    /// and default settings if none are stored yet.
    ///
    /// The initial tray's start date is fixed by the first call; later calls
    /// never move it.
    pub fn ensure_records(&self, user: &UserId, now: DateTime<Utc>) -> Result<UserRecords, DbError> {
        let tray = TrayConfig::initial(now);
        let tray_inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO tray_configs (user_id, current_tray, total_trays, days_per_tray, start_ms)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                user.as_str(),
                tray.current_tray,
                tray.total_trays,
                tray.days_per_tray,
                tray.start_date.timestamp_millis(),
            ],
        )?;

        let settings = Settings::default();
        let settings_inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO settings (user_id, daily_goal_hours, notifications_enabled, reminder_intervals)
            VALUES (?, ?, ?, ?)
            ",
            params![
                user.as_str(),
                settings.daily_goal_hours,
                settings.notifications_enabled,
                serde_json::to_string(&settings.reminder_intervals)?,
            ],
        )?;

        if tray_inserted + settings_inserted > 0 {
            tracing::debug!(user = %user, tray_inserted, settings_inserted, "stored initial records");
        }
        self.load_records(user, now)
    }

    /// Saves every named record for `user`.
    pub fn save_records(&mut self, user: &UserId, records: &UserRecords) -> Result<(), DbError> {
        self.save_log(user, &records.log)?;
        self.save_tray_config(user, &records.tray)?;
        self.save_settings(user, &records.settings)
    }

    /// Returns true if `user` has at least one log entry.
    pub fn has_log(&self, user: &UserId) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM log_entries WHERE user_id = ?)",
            [user.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // ========== Wear log ==========

    /// Loads the wear log for `user`, ordered by start time.
    pub fn load_log(&self, user: &UserId) -> Result<WearLog, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_ms, end_ms, status, reason, note
            FROM log_entries
            WHERE user_id = ?
            ORDER BY start_ms ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([user.as_str()], LogEntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(WearLog::from_entries(entries)?)
    }

    /// Upserts every entry of `log` for `user`.
    ///
    /// Entries are never deleted; an existing row with the same ID is
    /// overwritten, which is how a closed entry's end time lands.
    pub fn save_log(&mut self, user: &UserId, log: &WearLog) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO log_entries (id, user_id, start_ms, end_ms, status, reason, note)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    start_ms = excluded.start_ms,
                    end_ms = excluded.end_ms,
                    status = excluded.status,
                    reason = excluded.reason,
                    note = excluded.note
                ",
            )?;
            for entry in log.entries() {
                written += stmt.execute(params![
                    entry.id.as_str(),
                    user.as_str(),
                    entry.start_time.timestamp_millis(),
                    entry.end_time.map(|end| end.timestamp_millis()),
                    entry.status.as_str(),
                    entry.reason.map(|reason| reason.as_str()),
                    entry.note,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(user = %user, written, "saved wear log");
        Ok(written)
    }

    // ========== Tray configuration ==========

    pub fn load_tray_config(&self, user: &UserId) -> Result<Option<TrayConfig>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT current_tray, total_trays, days_per_tray, start_ms
                FROM tray_configs
                WHERE user_id = ?
                ",
                [user.as_str()],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((current_tray, total_trays, days_per_tray, start_ms)) = row else {
            return Ok(None);
        };
        let start_date = parse_millis(start_ms, "tray_configs", user.as_str())?;
        let config = TrayConfig::new(current_tray, total_trays, days_per_tray, start_date)
            .map_err(|err| invalid("tray_configs", user.as_str(), err))?;
        Ok(Some(config))
    }

    pub fn save_tray_config(&mut self, user: &UserId, config: &TrayConfig) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO tray_configs (user_id, current_tray, total_trays, days_per_tray, start_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                current_tray = excluded.current_tray,
                total_trays = excluded.total_trays,
                days_per_tray = excluded.days_per_tray,
                start_ms = excluded.start_ms
            ",
            params![
                user.as_str(),
                config.current_tray,
                config.total_trays,
                config.days_per_tray,
                config.start_date.timestamp_millis(),
            ],
        )?;
        tx.commit()?;
        tracing::debug!(user = %user, tray = config.current_tray, "saved tray config");
        Ok(())
    }

    // ========== Settings ==========

    pub fn load_settings(&self, user: &UserId) -> Result<Option<Settings>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT daily_goal_hours, notifications_enabled, reminder_intervals
                FROM settings
                WHERE user_id = ?
                ",
                [user.as_str()],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((daily_goal_hours, notifications_enabled, intervals)) = row else {
            return Ok(None);
        };
        let settings = Settings {
            daily_goal_hours,
            notifications_enabled,
            reminder_intervals: serde_json::from_str(&intervals)?,
        };
        settings
            .validate()
            .map_err(|err| invalid("settings", user.as_str(), err))?;
        Ok(Some(settings))
    }

    pub fn save_settings(&mut self, user: &UserId, settings: &Settings) -> Result<(), DbError> {
        let intervals = serde_json::to_string(&settings.reminder_intervals)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO settings (user_id, daily_goal_hours, notifications_enabled, reminder_intervals)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                daily_goal_hours = excluded.daily_goal_hours,
                notifications_enabled = excluded.notifications_enabled,
                reminder_intervals = excluded.reminder_intervals
            ",
            params![
                user.as_str(),
                settings.daily_goal_hours,
                settings.notifications_enabled,
                intervals,
            ],
        )?;
        tx.commit()?;
        tracing::debug!(user = %user, goal = settings.daily_goal_hours, "saved settings");
        Ok(())
    }

    // ========== Photos ==========

    /// Inserts a photo record, ignoring duplicates by ID.
    pub fn insert_photo(&mut self, user: &UserId, photo: &PhotoRecord) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO photos (id, user_id, taken_ms, kind, tray_number, image_ref)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                photo.id.as_str(),
                user.as_str(),
                photo.taken_at.timestamp_millis(),
                photo.kind.as_str(),
                photo.tray_number,
                photo.image_ref,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Lists photos for `user`, oldest first.
    pub fn list_photos(&self, user: &UserId) -> Result<Vec<PhotoRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, taken_ms, kind, tray_number, image_ref
            FROM photos
            WHERE user_id = ?
            ORDER BY taken_ms ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([user.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut photos = Vec::new();
        for row in rows {
            let (id, taken_ms, kind, tray_number, image_ref) = row?;
            photos.push(PhotoRecord {
                taken_at: parse_millis(taken_ms, "photos", &id)?,
                kind: PhotoKind::from_str(&kind).map_err(|err| invalid("photos", &id, err))?,
                id: PhotoId::new(id.clone()).map_err(|err| invalid("photos", &id, err))?,
                tray_number,
                image_ref,
            });
        }
        Ok(photos)
    }
}

/// A `log_entries` row before its strings are parsed.
struct LogEntryRow {
    id: String,
    start_ms: i64,
    end_ms: Option<i64>,
    status: String,
    reason: Option<String>,
    note: Option<String>,
}

impl LogEntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_ms: row.get(1)?,
            end_ms: row.get(2)?,
            status: row.get(3)?,
            reason: row.get(4)?,
            note: row.get(5)?,
        })
    }

    /// Parses the row. A reason stored on a wearing row is dropped.
    fn into_entry(self) -> Result<LogEntry, DbError> {
        const TABLE: &str = "log_entries";
        let id = self.id;

        let status = WearStatus::from_str(&self.status).map_err(|err| invalid(TABLE, &id, err))?;
        let reason = match (status, self.reason) {
            (WearStatus::Removed, Some(reason)) => {
                Some(RemovalReason::from_str(&reason).map_err(|err| invalid(TABLE, &id, err))?)
            }
            _ => None,
        };
        let start_time = parse_millis(self.start_ms, TABLE, &id)?;
        let end_time = self
            .end_ms
            .map(|end_ms| parse_millis(end_ms, TABLE, &id))
            .transpose()?;

        Ok(LogEntry {
            id: EntryId::new(id.clone()).map_err(|err| invalid(TABLE, &id, err))?,
            start_time,
            end_time,
            status,
            reason,
            note: self.note,
        })
    }
}

fn parse_millis(value_ms: i64, table: &'static str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(value_ms).ok_or_else(|| DbError::InvalidRecord {
        table,
        id: id.to_string(),
        message: format!("timestamp out of range: {value_ms}"),
    })
}

fn invalid(table: &'static str, id: &str, err: impl std::fmt::Display) -> DbError {
    DbError::InvalidRecord {
        table,
        id: id.to_string(),
        message: err.to_string(),
    }
}
