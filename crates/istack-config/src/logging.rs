//! Logging configuration.
//!
//! # Environment Variables
//!
//! - `LOG_LEVEL`: Level for the application's own targets (default: "info")
//! - `LOG_FILE`: Path of a JSON log file; the file layer is disabled when unset
//! - `LOG_FILE_ROTATION`: `daily`, `hourly`, `minutely` or `never` (default: `never`)

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::Rotation;

/// How often the JSON log file is rolled over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    #[default]
    Never,
}

impl LogRotation {
    /// Parses a rotation name, falling back to [`LogRotation::Never`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "minutely" => Self::Minutely,
            "hourly" => Self::Hourly,
            "daily" => Self::Daily,
            _ => Self::Never,
        }
    }

    pub fn as_rotation(self) -> Rotation {
        match self {
            Self::Minutely => Rotation::MINUTELY,
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            rotation: LogRotation::Never,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            file: env::var("LOG_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            rotation: env::var("LOG_FILE_ROTATION")
                .map(|v| LogRotation::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Splits [`LogConfig::file`] into the directory and file name prefix
    /// expected by a rolling appender.
    pub fn file_parts(&self) -> Option<(PathBuf, String)> {
        let file = self.file.as_deref()?;
        let name = file.file_name()?.to_string_lossy().into_owned();
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Some((dir, name))
    }
}
