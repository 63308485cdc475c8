//! Error types for the bin-release packager.
//!
//! Each concern keeps its own error enum close to the code that raises it;
//! [`PackagerError`] aggregates them so the pipeline and CLI deal with a
//! single type. Variants carry enough context to act on without a debugger.

use crate::extraction::ExtractionError;
use crate::release::download::DownloadError;
use crate::release::resolver::ReleaseParseError;
use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while resolving, building, or testing packages.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// Fetching release metadata or an asset failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The release API answered with a body that could not be understood.
    #[error(transparent)]
    ReleaseParse(#[from] ReleaseParseError),

    /// Unpacking a platform archive failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A manifest could not be serialized.
    #[error("failed to serialize manifest: {0}")]
    ManifestSerialization(#[from] serde_json::Error),

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// The exit status reported by the process.
        status: ExitStatus,
        /// Trimmed standard error captured from the process.
        stderr: String,
    },

    /// The installed binary reported an unexpected version line.
    #[error("version check failed: expected `{expected}`, got `{actual}`")]
    VersionMismatch {
        /// The line the installed binary should print first.
        expected: String,
        /// The first line it actually printed.
        actual: String,
    },

    /// A target name is not in the platform table.
    #[error("unknown target {name}; expected one of: {expected}")]
    UnknownTarget {
        /// The rejected target name.
        name: String,
        /// Comma-separated list of known target names.
        expected: String,
    },

    /// The installation test target has no package in the built release.
    #[error("target {name} was not built; add it to the targets to test it")]
    TargetNotBuilt {
        /// The target the installation test would run.
        name: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid config file {path}: {reason}")]
    InvalidConfig {
        /// Path of the offending file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
