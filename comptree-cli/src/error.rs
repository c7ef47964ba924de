use std::path::PathBuf;

use crate::config::ConfigLoadError;
use crate::installer::InstallError;

/// Errors that end a `comptree` command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule file or script could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path, or `-` for stdin.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The path, or `-` for stdout.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A rule file could not be compiled.
    #[error("{path}: {source}")]
    Compile {
        /// The path, or `-` for stdin.
        path: String,
        /// The underlying error.
        source: comptree_core::Error,
    },

    /// A file that would be overwritten already exists.
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    /// A completion line with nothing to complete.
    #[error("nothing to complete in '{0}'")]
    NothingToComplete(String),

    /// The settings file named with `--config-file` could not be loaded.
    #[error("{}: {source}", .path.display())]
    Settings {
        /// The settings file.
        path: PathBuf,
        /// The underlying error.
        source: ConfigLoadError,
    },

    /// Installing or uninstalling failed.
    #[error(transparent)]
    Install(#[from] InstallError),
}
