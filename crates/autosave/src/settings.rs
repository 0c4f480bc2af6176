//! Plugin configuration, loaded once at activation.

use std::fmt;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Smallest accepted `IntervalInMinutes` value.
pub const MIN_SAVE_INTERVAL_MINUTES: u32 = 1;
/// Largest accepted `IntervalInMinutes` value.
pub const MAX_SAVE_INTERVAL_MINUTES: u32 = 120;

// =============================================================================
// Settings
// =============================================================================

/// User-facing autosave configuration.
///
/// Loaded from the `AutoSave` section of the settings document and immutable
/// afterwards. All four keys are required. The interval range is enforced by
/// the activation routine, not by the parser or this type.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutosaveSettings {
    /// Minutes of unpaused play between save attempts. Valid range 1-120.
    pub interval_in_minutes: u32,
    /// Ask the host to skip its expensive auxiliary save step
    /// (thumbnail regeneration).
    pub fast_save: bool,
    /// When `true`, the interval timer stops while the game is paused, so
    /// paused time never counts toward the next save. When `false`, time
    /// keeps accruing but save attempts are suppressed until unpause.
    pub ignore_time_paused: bool,
    /// Write each save attempt's outcome to the save log.
    pub log_save_events: bool,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            interval_in_minutes: 15,
            fast_save: false,
            ignore_time_paused: true,
            log_save_events: true,
        }
    }
}

impl AutosaveSettings {
    /// Whether the configured interval is inside the accepted range.
    pub fn interval_in_range(&self) -> bool {
        (MIN_SAVE_INTERVAL_MINUTES..=MAX_SAVE_INTERVAL_MINUTES).contains(&self.interval_in_minutes)
    }
}

/// Top-level shape of the settings document.
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(rename = "AutoSave")]
    auto_save: AutosaveSettings,
}

/// Parse a settings document from JSON text.
pub fn parse_settings(text: &str) -> Result<AutosaveSettings, ConfigError> {
    let file: SettingsFile = serde_json::from_str(text)?;
    Ok(file.auto_save)
}

/// Load the settings document at `path`.
///
/// Fails if the file cannot be read or any key is missing or mistyped.
/// Nothing is retained from a failed load.
pub fn load_settings(path: &Path) -> Result<AutosaveSettings, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigError::Open(path.display().to_string(), e))?;
    parse_settings(&text)
}

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that abort plugin activation.
#[derive(Debug)]
pub enum ConfigError {
    /// The settings file could not be opened or read.
    Open(String, std::io::Error),
    /// The settings document was malformed or missing a required key.
    Parse(serde_json::Error),
    /// `IntervalInMinutes` is outside the accepted range.
    IntervalOutOfRange(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Open(path, e) => {
                write!(f, "Failed to open the settings file {path}: {e}")
            }
            ConfigError::Parse(e) => write!(f, "Failed to parse the settings file: {e}"),
            ConfigError::IntervalOutOfRange(value) => {
                if *value < MIN_SAVE_INTERVAL_MINUTES {
                    write!(
                        f,
                        "The save interval is less than {MIN_SAVE_INTERVAL_MINUTES} minute(s)."
                    )
                } else {
                    write!(
                        f,
                        "The save interval is greater than {MAX_SAVE_INTERVAL_MINUTES} minute(s)."
                    )
                }
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Open(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::IntervalOutOfRange(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
