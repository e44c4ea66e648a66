//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables the shell may override (date policy, palette, log level).
//! - Parse and validate JSON config handed over by the shell.
//!
//! # Invariants
//! - `avatar_palette` is never empty after validation.
//! - `log_level` only holds known levels; unknown names fail to parse.

use crate::logging::LogLevel;
use crate::model::person::{default_avatar_palette, AvatarColor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How the timeline treats record dates that do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidDatePolicy {
    /// Malformed dates sort below every valid date, keeping input order.
    #[default]
    SortLowest,
    /// The timeline query fails and reports the first malformed record.
    FailFast,
}

/// Configuration for one core session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub invalid_date_policy: InvalidDatePolicy,
    pub avatar_palette: Vec<AvatarColor>,
    pub log_level: LogLevel,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            invalid_date_policy: InvalidDatePolicy::default(),
            avatar_palette: default_avatar_palette(),
            log_level: LogLevel::default(),
        }
    }
}

/// Config parse/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyPalette,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::EmptyPalette => write!(f, "avatar_palette must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::EmptyPalette => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Parses config JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.avatar_palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}
