//! Archive extraction and cleanup.
//!
//! The client library bundle ships as a gzip-compressed tar whose entries
//! already carry the payload directory name, so entries are unpacked as-is
//! under the destination directory. The downloaded archive itself is owned by
//! an [`ArchiveGuard`], which deletes it on every exit path.

use flate2::read::GzDecoder;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use crate::errors::ProvisionError;

/// Extracts a tar.gz archive into `dest_dir`, preserving entry paths.
///
/// Creates the destination directory if it does not exist. Returns the number
/// of entries written.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened
/// - The archive is not a valid gzip-compressed tar stream
/// - An entry has an absolute path or a `..` component
/// - An entry would be written through a symlink that leaves `dest_dir`
/// - Directory, file, or link creation fails
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<usize, ProvisionError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| {
        ProvisionError::io(
            format!("failed to create directory {}", dest_dir.display()),
            e,
        )
    })?;

    let file = std::fs::File::open(archive_path).map_err(|e| {
        ProvisionError::io(
            format!("failed to open archive {}", archive_path.display()),
            e,
        )
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive.entries().map_err(|e| {
        ProvisionError::archive_with_source(
            format!("failed to read tar entries from {}", archive_path.display()),
            e,
        )
    })?;

    let mut extracted = 0;
    for entry in entries {
        let mut entry = entry.map_err(|e| {
            ProvisionError::archive_with_source(
                format!("failed to read tar entry from {}", archive_path.display()),
                e,
            )
        })?;

        let entry_type = entry.header().entry_type();
        if matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader) {
            continue;
        }

        let entry_path = entry
            .path()
            .map_err(|e| ProvisionError::archive_with_source("invalid entry path in archive", e))?
            .into_owned();

        if !is_safe_entry_path(&entry_path) {
            return Err(ProvisionError::archive(format!(
                "refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            )));
        }

        // unpack_in resolves hard links under dest_dir and refuses to write
        // through a symlink that leads outside it.
        let unpacked = entry.unpack_in(dest_dir).map_err(|e| {
            ProvisionError::archive_with_source(
                format!("failed to extract {}", entry_path.display()),
                e,
            )
        })?;
        if !unpacked {
            return Err(ProvisionError::archive(format!(
                "refusing to extract entry outside {}: {}",
                dest_dir.display(),
                entry_path.display()
            )));
        }

        extracted += 1;
    }

    tracing::debug!(
        archive = %archive_path.display(),
        dest = %dest_dir.display(),
        extracted,
        "archive extracted"
    );
    Ok(extracted)
}

/// Rejects absolute paths and any `..` component.
fn is_safe_entry_path(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Owns a downloaded archive file and deletes it when dropped.
///
/// Call [`ArchiveGuard::remove`] on the success path to surface removal
/// errors; on early returns the drop handler removes the file best-effort.
#[derive(Debug)]
pub struct ArchiveGuard {
    path: PathBuf,
    armed: bool,
}

impl ArchiveGuard {
    /// Takes ownership of the archive at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    /// Path of the guarded archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the archive now.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be deleted.
    pub fn remove(mut self) -> Result<(), ProvisionError> {
        self.armed = false;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProvisionError::io(
                format!("failed to remove archive {}", self.path.display()),
                e,
            )),
        }
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove archive");
            }
        }
    }
}
