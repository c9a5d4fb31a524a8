#![warn(clippy::pedantic)]

//! # td-provision
//!
//! Installs the Teradata client libraries that the DuckDB Teradata extension
//! links against. It is meant to run as a step of the extension's CI build,
//! once per target platform.
//!
//! For `linux_amd64` inside the build container, the bundle is downloaded,
//! optionally checked against a pinned SHA-256, extracted into the staging
//! directory, and its `setup.sh` is run. Other platforms are reported and
//! skipped without failing the build.
//!
//! ## Exit Codes
//!
//! - `0` - installed, or skipped on purpose
//! - `1` - download, checksum, archive, or setup script failure
//! - `2` - missing configuration or invalid arguments
//!
//! ## Examples
//!
//! ```bash
//! DUCKDB_PLATFORM=linux_amd64 LINUX_CI_IN_DOCKER=1 td-provision
//! td-provision --platform linux_amd64 --in-docker 1 --staging-dir /tmp/td
//! ```

mod config;
mod errors;
mod logging;
mod provision;

use anyhow::Result;
use clap::Parser;

use config::ProvisionArgs;
use errors::{EXIT_FAILURE, ProvisionError};
use provision::Outcome;

/// Teradata client library installer for DuckDB extension builds.
#[derive(Parser)]
#[command(
    name = "td-provision",
    author,
    version,
    about = "Installs the Teradata client libraries for a DuckDB build platform",
    after_help = "\
ENVIRONMENT VARIABLES:
    DUCKDB_PLATFORM             Target platform (e.g. linux_amd64)
    LINUX_CI_IN_DOCKER          Set to 1 inside the CI build container
    TD_PROVISION_URL            Archive URL override
    TD_PROVISION_SHA256         Expected SHA-256 of the archive
    TD_PROVISION_STAGING_DIR    Staging directory (default: teradata_installation)
    TD_PROVISION_LOG            Diagnostic log filter (default: warn)"
)]
pub struct Cli {
    #[command(flatten)]
    pub provision: ProvisionArgs,
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Prints the error and returns the exit code for its category.
fn handle_error(e: &anyhow::Error) -> i32 {
    eprintln!("Error: {e:?}");
    e.downcast_ref::<ProvisionError>()
        .map_or(EXIT_FAILURE, ProvisionError::exit_code)
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.provision.into_settings()?;
    tracing::debug!(?settings, "resolved settings");

    match provision::run(&settings).await? {
        Outcome::Installed { payload_dir } => {
            tracing::info!(payload = %payload_dir.display(), "installation complete");
        }
        Outcome::Skipped(reason) => {
            tracing::debug!(?reason, "nothing installed");
        }
    }

    Ok(())
}
