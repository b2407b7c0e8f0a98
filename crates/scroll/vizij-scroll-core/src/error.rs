//! Error types for scene and controller configuration.

use serde::{Deserialize, Serialize};

/// Invalid option values, raised synchronously by validating constructors and
/// setters. The target is left unchanged when one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    /// Negative, non-finite or unparsable duration
    #[error("Invalid value for option \"duration\": {value}")]
    InvalidDuration { value: String },

    /// A dynamic duration function produced an unusable value
    #[error("Invalid return value of supplied function for option \"duration\": {value}")]
    InvalidDurationFn { value: String },

    /// Offset did not parse as a finite number
    #[error("Invalid value for option \"offset\": {value}")]
    InvalidOffset { value: String },

    /// Trigger hook is neither a number nor a known alias
    #[error("Invalid value for option \"triggerHook\": {value}")]
    InvalidTriggerHook { value: String },

    /// Trigger element could not be resolved to an attached element
    #[error("Element defined in option \"triggerElement\" was not found: {target}")]
    TriggerElementNotFound { target: String },

    /// Log level outside 0..=3
    #[error("Invalid value for option \"loglevel\": {value}")]
    InvalidLogLevel { value: String },

    /// Scroll container could not be resolved
    #[error("Invalid scroll container supplied: {target}")]
    InvalidContainer { target: String },

    /// Refresh interval was negative or not finite
    #[error("Invalid value for option \"refreshInterval\": {value}")]
    InvalidRefreshInterval { value: String },
}

impl ConfigError {
    /// Option name the error refers to (for logging/diagnostics).
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. } | Self::InvalidDurationFn { .. } => "duration",
            Self::InvalidOffset { .. } => "offset",
            Self::InvalidTriggerHook { .. } => "triggerHook",
            Self::TriggerElementNotFound { .. } => "triggerElement",
            Self::InvalidLogLevel { .. } => "loglevel",
            Self::InvalidContainer { .. } => "container",
            Self::InvalidRefreshInterval { .. } => "refreshInterval",
        }
    }
}
