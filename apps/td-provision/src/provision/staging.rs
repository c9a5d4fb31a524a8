//! Staging directory layout.
//!
//! All paths the installer touches are derived from one root, so nothing
//! depends on the process working directory.
//!
//! ## Directory Structure
//!
//! ```text
//! teradata_installation/                 # Staging root (kept)
//!   td_linux.tar.gz                      # Downloaded archive (always removed)
//!   TeradataToolsAndUtilitiesBase/       # Extracted payload (kept)
//!     setup.sh                           # Bundled installer
//! ```

use std::path::{Path, PathBuf};

use crate::errors::ProvisionError;

/// File name the downloaded archive is saved under.
pub const ARCHIVE_FILE_NAME: &str = "td_linux.tar.gz";

/// Top-level directory inside the archive.
pub const PAYLOAD_DIR_NAME: &str = "TeradataToolsAndUtilitiesBase";

/// Setup script shipped inside the payload directory.
pub const SETUP_SCRIPT_NAME: &str = "setup.sh";

/// Paths under a staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    root: PathBuf,
}

impl StagingLayout {
    /// Creates a layout rooted at `root`. Nothing is created on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The staging root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the downloaded archive is written.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }

    /// Where the archive's payload ends up after extraction.
    #[must_use]
    pub fn payload_dir(&self) -> PathBuf {
        self.root.join(PAYLOAD_DIR_NAME)
    }

    /// Where the setup script is expected after extraction.
    #[must_use]
    pub fn setup_script_path(&self) -> PathBuf {
        self.payload_dir().join(SETUP_SCRIPT_NAME)
    }

    /// Creates the staging root if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure(&self) -> Result<(), ProvisionError> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            ProvisionError::io(
                format!("failed to create staging directory {}", self.root.display()),
                e,
            )
        })
    }

    /// Removes a payload left behind by an earlier run.
    ///
    /// Returns `true` if something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stale payload exists but cannot be removed.
    pub fn clear_payload(&self) -> Result<bool, ProvisionError> {
        let payload = self.payload_dir();
        let metadata = match std::fs::symlink_metadata(&payload) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(ProvisionError::io(
                    format!("failed to inspect {}", payload.display()),
                    e,
                ));
            }
        };

        let removed = if metadata.is_dir() {
            std::fs::remove_dir_all(&payload)
        } else {
            std::fs::remove_file(&payload)
        };
        removed.map_err(|e| {
            ProvisionError::io(
                format!("failed to remove previous payload {}", payload.display()),
                e,
            )
        })?;

        tracing::debug!(path = %payload.display(), "removed previous payload");
        Ok(true)
    }
}
