use serde::{Deserialize, Serialize};
use std::fmt;

/// Core error types with categories for better error handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalcError {
    /// Duration missing, zero, or negative; no target can be computed
    InvalidDuration,

    /// Speech entry delay consumes the whole track
    ExhaustedByDelay,

    /// Backend duration lookup failed (network, decode, bad status)
    Fetch(String),

    /// Configuration file could not be read or parsed
    Config(String),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalcError::InvalidDuration => write!(f, "Invalid Duration: no usable track duration"),
            CalcError::ExhaustedByDelay => {
                write!(f, "Exhausted By Delay: entry delay consumes the whole track")
            }
            CalcError::Fetch(msg) => write!(f, "Fetch Error: {}", msg),
            CalcError::Config(msg) => write!(f, "Config Error: {}", msg),
        }
    }
}

impl std::error::Error for CalcError {}

impl CalcError {
    /// Returns a user-friendly title for the error
    pub fn title(&self) -> &str {
        match self {
            CalcError::InvalidDuration => "No Track Duration",
            CalcError::ExhaustedByDelay => "Entry Delay Too Long",
            CalcError::Fetch(_) => "Duration Lookup Failed",
            CalcError::Config(_) => "Configuration Problem",
        }
    }

    /// Returns whether this error is recoverable (user can fall back to manual entry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            CalcError::InvalidDuration => true,  // Pick another track
            CalcError::ExhaustedByDelay => true, // Shorten the entry delay
            CalcError::Fetch(_) => true,         // Backend might recover; no auto-retry
            CalcError::Config(_) => true,        // Defaults apply
        }
    }

    /// Returns a suggested action for the user
    pub fn suggested_action(&self) -> Option<&str> {
        match self {
            CalcError::InvalidDuration => Some("Select a music track with a known duration"),
            CalcError::ExhaustedByDelay => Some("Reduce the speech entry delay below the track length"),
            CalcError::Fetch(_) => Some("Check the backend connection or enter a word count manually"),
            CalcError::Config(_) => Some("Fix or remove the config file; defaults will be used"),
        }
    }
}
