//! External process execution.
//!
//! Every ffmpeg call goes through [`ToolRunner`] so the pipeline can be driven
//! by a fake in tests.

use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;

#[derive(Debug)]
pub enum ToolError {
    /// The program could not be started at all.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The program ran and exited unsuccessfully. `code` is `None` when killed by a signal.
    Exit { program: String, code: Option<i32> },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::Spawn { program, source } => write!(f, "failed to start {program}: {source}"),
            ToolError::Exit {
                code: Some(code), ..
            } => write!(f, "process exited with error code {code}"),
            ToolError::Exit { code: None, .. } => write!(f, "process terminated by signal"),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::Spawn { source, .. } => Some(source),
            ToolError::Exit { .. } => None,
        }
    }
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit.
    async fn run(&self, program: &str, args: &[OsString]) -> Result<(), ToolError>;
}

/// Runs tools as child processes, one at a time.
#[derive(Clone, Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> Result<(), ToolError> {
        tracing::debug!(program, args = ?args, "spawning");
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(program, stderr = %stderr.trim(), "tool failed");
        Err(ToolError::Exit {
            program: program.to_string(),
            code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_error_reports_code() {
        let err = ToolError::Exit {
            program: "ffmpeg".to_string(),
            code: Some(183),
        };
        assert_eq!(err.to_string(), "process exited with error code 183");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = ProcessRunner
            .run("album-tidy-no-such-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let args = [OsString::from("-c"), OsString::from("exit 3")];
        let err = ProcessRunner.run("sh", &args).await.unwrap_err();
        assert!(matches!(err, ToolError::Exit { code: Some(3), .. }));
        ProcessRunner
            .run("sh", &[OsString::from("-c"), OsString::from("exit 0")])
            .await
            .unwrap();
    }
}
