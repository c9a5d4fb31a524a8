//! Error types for the td-provision CLI.
//!
//! Every failure the provisioner can hit is a `ProvisionError` variant. The
//! variants carry enough context for a readable message, and
//! [`ProvisionError::exit_code`] is the single place where a failure category
//! is turned into a process exit status.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for failures caused by missing or invalid configuration.
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code for every other fatal provisioning failure.
pub const EXIT_FAILURE: i32 = 1;

/// Consolidated error type for provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Required configuration is missing or malformed.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing or wrong.
        message: String,
    },

    /// Filesystem operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be fetched.
    #[error("download error: {message}")]
    Download {
        /// Description of the download error.
        message: String,
        /// The underlying error, when there is one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The downloaded archive does not match the expected digest.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The expected checksum.
        expected: String,
        /// The computed checksum.
        actual: String,
    },

    /// The archive is corrupt, unreadable, or contains an unsafe entry.
    #[error("archive error: {message}")]
    Archive {
        /// Description of the archive error.
        message: String,
        /// The underlying error, when there is one.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The extracted payload has no setup script.
    #[error("setup script not found: {path}")]
    MissingSetupScript {
        /// Where the script was expected.
        path: PathBuf,
    },

    /// The setup script ran but did not succeed.
    #[error("setup script failed: {status}")]
    SetupScriptFailed {
        /// Human readable exit status (exit code or terminating signal).
        status: String,
    },
}

impl ProvisionError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new `Download` error.
    #[must_use]
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Download` error with a source error.
    #[must_use]
    pub fn download_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Download {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `Archive` error.
    #[must_use]
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Archive` error wrapping the decoder's I/O error.
    #[must_use]
    pub fn archive_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Archive {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `MissingSetupScript` error.
    #[must_use]
    pub fn missing_setup_script(path: PathBuf) -> Self {
        Self::MissingSetupScript { path }
    }

    /// Creates a new `SetupScriptFailed` error.
    #[must_use]
    pub fn setup_script_failed(status: impl Into<String>) -> Self {
        Self::SetupScriptFailed {
            status: status.into(),
        }
    }

    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => EXIT_CONFIGURATION,
            _ => EXIT_FAILURE,
        }
    }
}
