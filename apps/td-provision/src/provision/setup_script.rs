//! Hand-off to the setup script bundled in the payload.
//!
//! The script is opaque to us: it is run with `bash`, from its own directory,
//! with stdio inherited so its output lands in the CI log as-is.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::errors::ProvisionError;

/// Argument the bundled script expects for a non-interactive install of all
/// components.
pub const SETUP_SCRIPT_ARG: &str = "a";

/// Interpreter the script is run with.
const SETUP_SHELL: &str = "bash";

/// Runs `bash <script> <arg>` with the script's directory as working directory.
///
/// # Errors
///
/// Returns an error if:
/// - `script` is not an existing file (nothing is executed)
/// - `bash` cannot be started
/// - The script exits with a non-zero status or is killed by a signal
pub fn run_setup_script(script: &Path, arg: &str) -> Result<(), ProvisionError> {
    if !script.is_file() {
        return Err(ProvisionError::missing_setup_script(script.to_path_buf()));
    }

    let (dir, file_name) = match (script.parent(), script.file_name()) {
        (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => (dir, name),
        (_, Some(name)) => (Path::new("."), name),
        _ => return Err(ProvisionError::missing_setup_script(script.to_path_buf())),
    };

    tracing::debug!(script = %script.display(), arg, "running setup script");

    let status = Command::new(SETUP_SHELL)
        .arg(file_name)
        .arg(arg)
        .current_dir(dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| {
            ProvisionError::io(
                format!("failed to execute {SETUP_SHELL} {}", script.display()),
                e,
            )
        })?;

    if !status.success() {
        return Err(ProvisionError::setup_script_failed(describe_status(status)));
    }

    Ok(())
}

fn describe_status(status: ExitStatus) -> String {
    status
        .code()
        .map_or_else(|| status.to_string(), |code| format!("exit code {code}"))
}
