//! Configuration errors.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    /// Reading a config file.
    Read,
    /// Writing a config file.
    Write,
    /// Creating the directory that holds a config file.
    CreateDir,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
            IoAction::CreateDir => "create directory",
        })
    }
}

/// Errors from loading, saving or checking a `pdkit.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The filesystem refused a read, write or mkdir.
    #[error("cannot {action} '{}': {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: IoAction,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML or does not match the config schema.
    #[error("invalid config{}: {source}", origin(.path.as_deref()))]
    Parse {
        /// Source file, when the text came from disk.
        path: Option<PathBuf>,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be rendered as TOML.
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Values parsed but are out of range.
    #[error("invalid config values: {0}")]
    Invalid(#[from] crate::validation::ValidationError),
}

fn origin(path: Option<&Path>) -> String {
    path.map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// A failed read of `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Read, path, source)
    }

    /// A failed write of `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Write, path, source)
    }

    /// A failed `create_dir_all` of `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::CreateDir, path, source)
    }

    fn io(action: IoAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Attaches the file a parse error came from.
    pub(crate) fn in_file(self, file: &Path) -> Self {
        match self {
            ConfigError::Parse { path: None, source } => ConfigError::Parse {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(source: toml::de::Error) -> Self {
        ConfigError::Parse { path: None, source }
    }
}
