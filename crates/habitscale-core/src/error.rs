//! Core error types for habitscale-core.
//!
//! Validation failures are the only errors the balance engine itself can
//! produce. Demand tree edits have their own error type; everything else
//! comes from loading and saving configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::EntryList;

/// Core error type for habitscale-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Demand tree errors
    #[error("Demand tree error: {0}")]
    Demand(#[from] DemandError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not resolve the configuration directory
    #[error("Cannot resolve configuration directory: {0}")]
    NoDataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Rejected user input. A rejected add never touches the ledger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Entry name empty (or only whitespace)
    #[error("{list} entry needs a name")]
    EmptyName { list: EntryList },

    /// Habit name empty (or only whitespace)
    #[error("the habit needs a name")]
    EmptyHabitName,

    /// Score text is not a number at all
    #[error("'{raw}' is not a number")]
    InvalidScore { raw: String },

    /// NaN or infinite score
    #[error("{list} score must be a finite number, got {score}")]
    NonFiniteScore { list: EntryList, score: f64 },

    /// Friction must push against the habit
    #[error("friction score must be negative, got {score}")]
    NonNegativeFriction { score: f64 },

    /// The entry is finite but the list total would not be
    #[error("{list} total would overflow")]
    TotalOverflow { list: EntryList },
}

/// Rejected demand tree edits. A rejected edit leaves the tree unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemandError {
    #[error("a demand needs a name")]
    EmptyDemandName,

    #[error("an action needs a name")]
    EmptyActionName,

    #[error("demand '{0}' already exists")]
    DuplicateDemand(String),

    #[error("no demand named '{0}'")]
    UnknownDemand(String),

    #[error("demand '{demand}' has no action named '{action}'")]
    UnknownAction { demand: String, action: String },

    /// NaN or infinite short/long value
    #[error("action '{action}' needs finite values")]
    NonFiniteValue { action: String },

    /// Only a named habit can be filed as an action
    #[error("the session has no habit yet")]
    UnnamedHabit,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
