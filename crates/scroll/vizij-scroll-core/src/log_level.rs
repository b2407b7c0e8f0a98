//! Per-instance log verbosity layered over the `log` facade.
//!
//! Scenes and controllers carry their own level (0 silent, 1 errors,
//! 2 errors + warnings, 3 everything). A message is forwarded to `log` only
//! when its level is at or below the instance's configured level.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum LogLevel {
    Silent = 0,
    Error = 1,
    #[default]
    Warn = 2,
    Debug = 3,
}

impl LogLevel {
    #[inline]
    fn as_log(self) -> Option<log::Level> {
        match self {
            Self::Silent => None,
            Self::Error => Some(log::Level::Error),
            Self::Warn => Some(log::Level::Warn),
            Self::Debug => Some(log::Level::Debug),
        }
    }
}

impl TryFrom<i64> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, ConfigError> {
        match value {
            0 => Ok(Self::Silent),
            1 => Ok(Self::Error),
            2 => Ok(Self::Warn),
            3 => Ok(Self::Debug),
            other => Err(ConfigError::InvalidLogLevel {
                value: other.to_string(),
            }),
        }
    }
}

impl From<LogLevel> for i64 {
    fn from(level: LogLevel) -> Self {
        level as i64
    }
}

pub(crate) fn emit(configured: LogLevel, level: LogLevel, target: &str, args: fmt::Arguments<'_>) {
    if level > configured {
        return;
    }
    if let Some(lvl) = level.as_log() {
        log::log!(target: target, lvl, "{}", args);
    }
}
