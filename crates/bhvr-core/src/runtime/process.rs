//! Subprocess execution with a bounded timeout

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for short commands (`--version`, `git init`)
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for dependency installation
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited with code {}{}", .code.map_or("unknown".to_string(), |c| c.to_string()), stderr_tail(.stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{program}` timed out after {} seconds", .after.as_secs())]
    TimedOut { program: String, after: Duration },
}

fn stderr_tail(stderr: &str) -> String {
    match stderr.trim().lines().last() {
        Some(line) if !line.is_empty() => format!(": {}", line),
        _ => String::new(),
    }
}

/// Runs external programs; only success or failure is observed
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        limit: Duration,
    ) -> Result<(), CommandError>;
}

/// [`CommandRunner`] spawning real processes with tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        limit: Duration,
    ) -> Result<(), CommandError> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "spawn");

        let child = TokioCommand::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the child on timeout kills it
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(CommandError::TimedOut {
                    program: program.to_string(),
                    after: limit,
                })
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_includes_last_stderr_line() {
        let err = CommandError::Failed {
            program: "bun".to_string(),
            code: Some(1),
            stderr: "warn: something\nerror: lockfile is broken\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`bun` exited with code 1: error: lockfile is broken"
        );
    }

    #[test]
    fn test_timed_out_message() {
        let err = CommandError::TimedOut {
            program: "npm".to_string(),
            after: Duration::from_secs(120),
        };
        assert_eq!(err.to_string(), "`npm` timed out after 120 seconds");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = std::env::temp_dir();
        let err = TokioCommandRunner
            .run(
                "bhvr-definitely-not-a-real-binary",
                &["--version"],
                &dir,
                COMMAND_TIMEOUT,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
