//! Checksum verification for the downloaded archive.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::errors::ProvisionError;

/// Verifies that a file matches the expected SHA256 checksum.
///
/// `expected` is compared case-insensitively.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or read
/// - The computed checksum does not match the expected value
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<(), ProvisionError> {
    let computed = compute_sha256(file_path)?;

    if computed != expected.to_lowercase() {
        tracing::debug!(path = %file_path.display(), %computed, "checksum mismatch");
        return Err(ProvisionError::checksum_mismatch(
            expected.to_lowercase(),
            computed,
        ));
    }

    Ok(())
}

/// Computes the SHA256 hash of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String, ProvisionError> {
    let mut file = std::fs::File::open(file_path).map_err(|e| {
        ProvisionError::io(
            format!("failed to open {} for checksum", file_path.display()),
            e,
        )
    })?;

    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| {
        ProvisionError::io(
            format!("failed to read {} for checksum", file_path.display()),
            e,
        )
    })?;

    Ok(hex::encode(hasher.finalize()))
}
