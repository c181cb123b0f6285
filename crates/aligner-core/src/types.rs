//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An instant before the Unix epoch.
    #[error("timestamp must not be before the epoch, got {value_ms}ms")]
    NegativeTimestamp { value_ms: i64 },

    /// A tray ordinal of zero; trays are 1-based.
    #[error("tray numbers start at 1")]
    ZeroTray,

    /// A tray duration of zero days.
    #[error("days per tray must be at least 1")]
    ZeroDaysPerTray,

    /// Reminder offsets must be positive and strictly ascending.
    #[error("reminder intervals must be positive and strictly ascending, got {intervals:?}")]
    ReminderIntervals { intervals: Vec<u32> },

    /// Invalid wear status value.
    #[error("invalid wear status: {value}")]
    InvalidStatus { value: String },

    /// Invalid removal reason value.
    #[error("invalid removal reason: {value}")]
    InvalidReason { value: String },

    /// Invalid photo kind value.
    #[error("invalid photo kind: {value}")]
    InvalidPhotoKind { value: String },
}

/// Whether the appliance is in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WearStatus {
    /// The appliance is worn.
    Wearing,
    /// The appliance is out.
    Removed,
}

impl WearStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wearing => "WEARING",
            Self::Removed => "REMOVED",
        }
    }

    /// The other state.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Wearing => Self::Removed,
            Self::Removed => Self::Wearing,
        }
    }
}

impl fmt::Display for WearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WearStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEARING" => Ok(Self::Wearing),
            "REMOVED" => Ok(Self::Removed),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Why the appliance was taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalReason {
    Eating,
    Brushing,
    Sports,
    Other,
}

impl RemovalReason {
    /// All reasons, in display order.
    pub const ALL: [Self; 4] = [Self::Eating, Self::Brushing, Self::Sports, Self::Other];

    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eating => "EATING",
            Self::Brushing => "BRUSHING",
            Self::Sports => "SPORTS",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RemovalReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EATING" => Ok(Self::Eating),
            "BRUSHING" => Ok(Self::Brushing),
            "SPORTS" => Ok(Self::Sports),
            "OTHER" => Ok(Self::Other),
            _ => Err(ValidationError::InvalidReason {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Creates a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// Produced by whatever identity system sits in front of the tracker;
    /// the core only requires it to be stable and non-empty.
    UserId, "user ID"
);

define_string_id!(
    /// A validated log entry identifier.
    EntryId, "entry ID"
);

define_string_id!(
    /// A validated photo record identifier.
    PhotoId, "photo ID"
);
