//! Diagnostic logging to stderr.
//!
//! Progress meant for people is printed to stdout; `tracing` events carry the
//! details underneath (paths, byte counts, statuses) and are silent unless
//! `TD_PROVISION_LOG` asks for them, e.g. `TD_PROVISION_LOG=td_provision=debug`.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Filter used when `TD_PROVISION_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

/// Installs the global `tracing` subscriber writing to stderr.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
