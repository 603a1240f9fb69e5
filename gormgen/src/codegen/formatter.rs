//! Runs the external source formatter over the generated package

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{CodegenError, Result};

/// Run `<command> -w <dir>` once over the output directory.
///
/// Failing to start the command and a non-zero exit are both errors.
pub fn format_output(dir: &Path, command: &str) -> Result<()> {
    debug!("Running {} -w {:?}", command, dir);
    let output = Command::new(command)
        .arg("-w")
        .arg(dir)
        .output()
        .map_err(|e| CodegenError::Format {
            command: command.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => output.status.to_string(),
            text => text.to_string(),
        };
        return Err(CodegenError::Format {
            command: command.to_string(),
            message,
        });
    }

    info!("Formatted {:?} with {}", dir, command);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = format_output(dir.path(), "gormgen-no-such-formatter").unwrap_err();
        match err {
            CodegenError::Format { command, .. } => {
                assert_eq!(command, "gormgen-no-such-formatter")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // `false -w <dir>` ignores its arguments and exits 1
        let err = format_output(dir.path(), "false").unwrap_err();
        assert!(matches!(err, CodegenError::Format { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command() {
        let dir = tempfile::tempdir().unwrap();
        // `true` accepts any arguments
        format_output(dir.path(), "true").unwrap();
    }
}
