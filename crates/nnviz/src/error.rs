#![forbid(unsafe_code)]

//! Unified error type and recovery policy.
//!
//! Each subsystem keeps its own typed error. [`Error`] wraps them so a host
//! can propagate with `?` and then ask [`Error::recovery`] how to keep the
//! view alive.

use std::path::PathBuf;

use nnviz_core::{ConfigurationError, StructuralError};
use nnviz_runtime::SchedulerError;

use crate::config::ConfigError;

/// Standard result type for nnviz APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("invalid color scheme: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    InvariantViolation(SchedulerError),

    #[error("cannot read snapshot {path}: {source}")]
    SnapshotFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid JSON: {0}")]
    SnapshotJson(#[from] serde_json::Error),

    #[error("unknown preset {name:?} (available: {available})")]
    UnknownPreset { name: String, available: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SchedulerError> for Error {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Structural(err) => Self::Structural(err),
            other @ SchedulerError::InvariantViolation { .. } => Self::InvariantViolation(other),
        }
    }
}

/// What the host should do after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Keep the last good model, scheme, and scene on screen.
    KeepPrevious,
    /// Stop: state can no longer be trusted, or there is nothing to show.
    Abort,
}

impl Error {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Structural(_) | Self::Configuration(_) | Self::SnapshotJson(_) => {
                Recovery::KeepPrevious
            }
            Self::InvariantViolation(_)
            | Self::Config(_)
            | Self::SnapshotFile { .. }
            | Self::UnknownPreset { .. }
            | Self::Io(_) => Recovery::Abort,
        }
    }

    /// Short label for log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Structural(_) => "structural",
            Self::Configuration(_) => "configuration",
            Self::Config(_) => "config",
            Self::InvariantViolation(_) => "invariant",
            Self::SnapshotFile { .. } | Self::SnapshotJson(_) => "snapshot",
            Self::UnknownPreset { .. } => "preset",
            Self::Io(_) => "io",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recovery() == Recovery::KeepPrevious
    }

    /// Process exit code for the CLI.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvariantViolation(_) => 70,
            Self::Config(_) | Self::Configuration(_) | Self::UnknownPreset { .. } => 2,
            _ => 1,
        }
    }
}
