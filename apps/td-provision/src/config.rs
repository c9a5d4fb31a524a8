//! Runtime configuration for td-provision.
//!
//! Every setting can be given on the command line or through the environment.
//! The two CI variables (`DUCKDB_PLATFORM`, `LINUX_CI_IN_DOCKER`) are the ones
//! the DuckDB extension build sets; the `TD_PROVISION_*` variables exist for
//! mirrors, pinned digests, and tests.

use clap::Args;
use std::path::PathBuf;

use crate::errors::ProvisionError;

/// Environment variable naming the target DuckDB platform.
pub const PLATFORM_ENV: &str = "DUCKDB_PLATFORM";

/// Environment variable set to `1` inside the Linux CI build containers.
pub const IN_DOCKER_ENV: &str = "LINUX_CI_IN_DOCKER";

/// Environment variable overriding the archive download URL.
pub const URL_ENV: &str = "TD_PROVISION_URL";

/// Environment variable holding the expected SHA-256 of the archive.
pub const SHA256_ENV: &str = "TD_PROVISION_SHA256";

/// Environment variable overriding the staging directory.
pub const STAGING_DIR_ENV: &str = "TD_PROVISION_STAGING_DIR";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "TD_PROVISION_LOG";

/// Where the Linux client library bundle is published.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://test-bucket-ceiveran.s3.eu-west-1.amazonaws.com/td_linux.tar.gz";

/// Staging directory, relative to the working directory unless overridden.
pub const DEFAULT_STAGING_DIR: &str = "teradata_installation";

/// Command-line arguments that select what to install and where.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Target platform identifier (e.g. `linux_amd64`).
    #[arg(long, env = PLATFORM_ENV, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Whether this runs inside the CI build container.
    ///
    /// Only the value `1` means yes; anything else means no.
    #[arg(
        long = "in-docker",
        env = IN_DOCKER_ENV,
        value_name = "FLAG",
        default_value = "0",
        action = clap::ArgAction::Set,
        value_parser = parse_in_docker_flag
    )]
    pub in_docker: bool,

    /// URL of the gzip-compressed tar archive to install.
    #[arg(long, env = URL_ENV, default_value = DEFAULT_DOWNLOAD_URL)]
    pub url: String,

    /// Expected SHA-256 of the archive, as 64 hex characters.
    ///
    /// When given, the archive is verified before anything is extracted.
    #[arg(long, env = SHA256_ENV, value_name = "HEX")]
    pub sha256: Option<String>,

    /// Directory that receives the archive and its extracted payload.
    #[arg(long, env = STAGING_DIR_ENV, default_value = DEFAULT_STAGING_DIR)]
    pub staging_dir: PathBuf,
}

/// Validated settings the provisioner runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Platform identifier; `None` when unset or blank.
    pub platform: Option<String>,
    /// True only when running inside the CI build container.
    pub in_build_container: bool,
    /// Archive URL.
    pub download_url: String,
    /// Lowercase hex SHA-256 the archive must match, if pinned.
    pub expected_sha256: Option<String>,
    /// Staging directory.
    pub staging_dir: PathBuf,
}

impl ProvisionArgs {
    /// Normalizes the raw arguments into [`Settings`].
    ///
    /// A blank platform is treated as unset; deciding what an unset platform
    /// means is left to the provisioner.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is blank or the digest is not
    /// a 64 character hex string.
    pub fn into_settings(self) -> Result<Settings, ProvisionError> {
        let download_url = self.url.trim().to_string();
        if download_url.is_empty() {
            return Err(ProvisionError::configuration(format!(
                "download URL must not be empty (set --url or {URL_ENV})"
            )));
        }

        let expected_sha256 = match self.sha256.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(digest) => Some(normalize_sha256(digest)?),
        };

        Ok(Settings {
            platform: self
                .platform
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            in_build_container: self.in_docker,
            download_url,
            expected_sha256,
            staging_dir: self.staging_dir,
        })
    }
}

/// Interprets the value of `LINUX_CI_IN_DOCKER`.
///
/// Never fails: values other than `1` simply mean "not in the container".
#[allow(clippy::unnecessary_wraps)]
pub fn parse_in_docker_flag(value: &str) -> Result<bool, String> {
    Ok(value == "1")
}

fn normalize_sha256(digest: &str) -> Result<String, ProvisionError> {
    match hex::decode(digest) {
        Ok(bytes) if bytes.len() == 32 => Ok(digest.to_ascii_lowercase()),
        _ => Err(ProvisionError::configuration(format!(
            "expected SHA-256 must be 64 hex characters, got '{digest}'"
        ))),
    }
}
