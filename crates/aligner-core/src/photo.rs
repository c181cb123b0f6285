//! Progress photo metadata.
//!
//! Image storage is the caller's concern; the core only stamps each new
//! record with the tray being worn when it was taken.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tray::TrayConfig;
use crate::types::{PhotoId, ValidationError};

/// Which view of the teeth a photo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoKind {
    Front,
    Upper,
    Lower,
}

impl PhotoKind {
    /// String representation for database storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "FRONT",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PhotoKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRONT" => Ok(Self::Front),
            "UPPER" => Ok(Self::Upper),
            "LOWER" => Ok(Self::Lower),
            _ => Err(ValidationError::InvalidPhotoKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A stored progress photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: PhotoId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub taken_at: DateTime<Utc>,
    pub kind: PhotoKind,
    /// The tray worn when the photo was taken.
    pub tray_number: u32,
    /// Opaque reference to the image, e.g. a path or URL.
    pub image_ref: String,
}

impl PhotoRecord {
    /// Records a photo taken at `now` while wearing the configured tray.
    pub fn capture(
        kind: PhotoKind,
        image_ref: impl Into<String>,
        tray: &TrayConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let image_ref = image_ref.into();
        if image_ref.is_empty() {
            return Err(ValidationError::Empty { field: "image reference" });
        }
        Ok(Self {
            id: PhotoId::generate(),
            taken_at: now,
            kind,
            tray_number: tray.current_tray,
            image_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn capture_stamps_current_tray() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut tray = TrayConfig::initial(now);
        tray.advance(now);

        let photo = PhotoRecord::capture(PhotoKind::Front, "photos/1.jpg", &tray, now).unwrap();
        assert_eq!(photo.tray_number, 2);
        assert_eq!(photo.taken_at, now);
    }

    #[test]
    fn capture_requires_image_ref() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tray = TrayConfig::initial(now);
        assert!(PhotoRecord::capture(PhotoKind::Upper, "", &tray, now).is_err());
    }

    #[test]
    fn kind_parses_from_storage_string() {
        assert_eq!("LOWER".parse::<PhotoKind>().unwrap(), PhotoKind::Lower);
        assert!("SIDE".parse::<PhotoKind>().is_err());
    }
}
