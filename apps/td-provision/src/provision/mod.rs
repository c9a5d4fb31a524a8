//! The provisioner: platform dispatch and the install sequence.
//!
//! ## Module Structure
//!
//! - [`platform`] - DuckDB platform identifiers
//! - [`staging`] - Staging directory layout
//! - [`download`] - HTTP download with progress display
//! - [`verify`] - SHA256 checksum verification
//! - [`archive`] - tar.gz extraction and archive cleanup
//! - [`setup_script`] - Running the bundled setup script

pub mod archive;
pub mod download;
pub mod platform;
pub mod setup_script;
pub mod staging;
pub mod verify;

use std::fmt;
use std::path::PathBuf;

pub use archive::{ArchiveGuard, extract_tar_gz};
pub use download::download_file;
pub use platform::Platform;
pub use setup_script::{SETUP_SCRIPT_ARG, run_setup_script};
pub use staging::StagingLayout;
pub use verify::verify_checksum;

use crate::config::{PLATFORM_ENV, Settings};
use crate::errors::ProvisionError;

/// What a provisioning run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The bundle was installed and its setup script succeeded.
    Installed {
        /// Where the payload was extracted.
        payload_dir: PathBuf,
    },
    /// Nothing was installed, deliberately.
    Skipped(SkipReason),
}

/// Why a run installed nothing without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The platform may only be provisioned inside the CI build container.
    OutsideBuildContainer(Platform),
    /// The platform is known but has no bundle yet.
    NotYetSupported(Platform),
    /// The platform identifier is not one we know.
    Unsupported(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideBuildContainer(platform) => write!(
                f,
                "Installing for {platform} is only allowed inside the Docker build container; skipping."
            ),
            Self::NotYetSupported(platform) => write!(
                f,
                "Platform {platform} is not yet supported; nothing was installed."
            ),
            Self::Unsupported(platform) => write!(f, "Unsupported platform: {platform}"),
        }
    }
}

/// Decides what to do for the configured platform and does it.
///
/// Only `linux_amd64` inside the build container reaches the network or the
/// filesystem; every other platform is reported and skipped.
///
/// An unset or blank platform is a configuration error (exit code 2) rather
/// than a silent no-op, so a CI job that forgets `DUCKDB_PLATFORM` fails
/// instead of building without the client libraries.
///
/// # Errors
///
/// Returns a configuration error if no platform is set, and any error from
/// the install sequence otherwise.
pub async fn run(settings: &Settings) -> Result<Outcome, ProvisionError> {
    let Some(identifier) = settings.platform.as_deref() else {
        return Err(ProvisionError::configuration(format!(
            "{PLATFORM_ENV} environment variable is not set"
        )));
    };

    println!("Installing Teradata Dynamic Libraries for platform: {identifier}");

    let outcome = match Platform::parse(identifier) {
        None => Outcome::Skipped(SkipReason::Unsupported(identifier.to_string())),
        Some(platform) if !platform.is_installable() => {
            Outcome::Skipped(SkipReason::NotYetSupported(platform))
        }
        Some(platform)
            if platform.requires_build_container() && !settings.in_build_container =>
        {
            Outcome::Skipped(SkipReason::OutsideBuildContainer(platform))
        }
        Some(platform) => install(platform, settings).await?,
    };

    if let Outcome::Skipped(reason) = &outcome {
        tracing::info!(platform = identifier, ?reason, "skipped");
        println!("{reason}");
    }

    Ok(outcome)
}

/// Download, verify, extract, clean up, and hand off to the setup script.
async fn install(platform: Platform, settings: &Settings) -> Result<Outcome, ProvisionError> {
    let layout = StagingLayout::new(&settings.staging_dir);
    layout.ensure()?;

    println!("Installing Teradata Dynamic Libraries for {platform}...");
    println!(
        "Downloading Teradata Dynamic Libraries from {}...",
        settings.download_url
    );
    let archive_path = layout.archive_path();
    download_file(&settings.download_url, &archive_path).await?;
    let archive = ArchiveGuard::new(archive_path);
    println!(
        "Downloaded Teradata Dynamic Libraries to {}.",
        archive.path().display()
    );

    if let Some(expected) = settings.expected_sha256.as_deref() {
        println!("Verifying checksum...");
        verify_checksum(archive.path(), expected)?;
    }

    if layout.clear_payload()? {
        println!("Removed previous installation files.");
    }
    extract_tar_gz(archive.path(), layout.root())?;
    archive.remove()?;
    println!("Extracted Teradata Dynamic Libraries.");

    println!("Running setup script to complete the installation...");
    run_setup_script(&layout.setup_script_path(), SETUP_SCRIPT_ARG)?;

    println!("Teradata Dynamic Libraries installed successfully for {platform}.");
    Ok(Outcome::Installed {
        payload_dir: layout.payload_dir(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(platform: Option<&str>, in_build_container: bool, staging: PathBuf) -> Settings {
        Settings {
            platform: platform.map(str::to_string),
            in_build_container,
            // Nothing listens on the discard port; reaching the network fails fast.
            download_url: "http://127.0.0.1:9/td_linux.tar.gz".to_string(),
            expected_sha256: None,
            staging_dir: staging,
        }
    }

    #[tokio::test]
    async fn missing_platform_is_a_configuration_error() {
        let temp = tempfile::tempdir().expect("Should create temp dir");
        let staging = temp.path().join("stage");

        let err = run(&settings(None, true, staging.clone())).await.unwrap_err();

        assert!(matches!(err, ProvisionError::Configuration { .. }));
        assert!(err.to_string().contains(PLATFORM_ENV));
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn linux_amd64_outside_container_is_skipped() {
        let temp = tempfile::tempdir().expect("Should create temp dir");
        let staging = temp.path().join("stage");

        let outcome = run(&settings(Some("linux_amd64"), false, staging.clone()))
            .await
            .expect("Should skip");

        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::OutsideBuildContainer(Platform::LinuxAmd64))
        );
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn linux_arm64_is_not_yet_supported() {
        let temp = tempfile::tempdir().expect("Should create temp dir");
        let staging = temp.path().join("stage");

        let outcome = run(&settings(Some("linux_arm64"), true, staging.clone()))
            .await
            .expect("Should skip");

        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::NotYetSupported(Platform::LinuxArm64))
        );
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn unknown_platform_is_unsupported() {
        let temp = tempfile::tempdir().expect("Should create temp dir");
        let staging = temp.path().join("stage");

        let outcome = run(&settings(Some("osx_arm64"), true, staging.clone()))
            .await
            .expect("Should skip");

        assert_eq!(
            outcome,
            Outcome::Skipped(SkipReason::Unsupported("osx_arm64".to_string()))
        );
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn failed_download_leaves_empty_staging_directory() {
        let temp = tempfile::tempdir().expect("Should create temp dir");
        let staging = temp.path().join("stage");

        let err = run(&settings(Some("linux_amd64"), true, staging.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Download { .. }), "{err:?}");
        assert!(staging.is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(&staging)
            .expect("Should read staging")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn skip_reasons_read_well() {
        assert_eq!(
            SkipReason::Unsupported("wasm_mvp".to_string()).to_string(),
            "Unsupported platform: wasm_mvp"
        );
        assert!(
            SkipReason::NotYetSupported(Platform::LinuxArm64)
                .to_string()
                .contains("not yet supported")
        );
        assert!(
            SkipReason::OutsideBuildContainer(Platform::LinuxAmd64)
                .to_string()
                .contains("Docker")
        );
    }
}
