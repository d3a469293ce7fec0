//! Blocking execution of the external tools (changelog generator, manifest
//! editor).
use log::*;
use std::{path::Path, process::Command};

use crate::error::{ReleaseError, Result};

/// Run `program` with `args` inside `cwd` and return its trimmed stdout.
///
/// A non-zero exit is logged with both captured streams and returned as
/// [`ReleaseError::ToolFailed`].
pub fn run_tool(program: &str, args: &[String], cwd: &Path) -> Result<String> {
    debug!("running: {program} {}", args.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|err| ReleaseError::ToolFailed {
            program: program.to_string(),
            code: None,
            stderr: err.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("{program} exited with status {}", output.status);
        error!("stdout: {stdout}");
        error!("stderr: {stderr}");
        return Err(ReleaseError::ToolFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout.trim().to_string())
}
