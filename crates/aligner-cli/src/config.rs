//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// User identifier used when none is configured.
pub const DEFAULT_USER: &str = "default";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Whose records to read and write.
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("aligner.db"),
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ALIGNER_DATABASE_PATH, ALIGNER_USER
        figment = figment.merge(Env::prefixed("ALIGNER_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for aligner.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aligner"))
}

/// Returns the platform-specific data directory for aligner.
///
/// On Linux: `~/.local/share/aligner`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("aligner"))
}
