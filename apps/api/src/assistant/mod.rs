//! Assistant runner: the single point of entry for every call to the AI assistant CLI.
//!
//! ARCHITECTURAL RULE: handlers never spawn the assistant themselves.
//! All prompts go through an `AssistantRunner` held in `AppState`.
//!
//! The default runner invokes `<bin> -p <prompt>` and returns its trimmed stdout.
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

pub mod normalizer;
pub mod prompts;

pub use normalizer::{normalize, Normalized};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant CLI '{0}' is not installed")]
    Unavailable(String),

    #[error("assistant timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("failed to run assistant: {0}")]
    Io(#[from] std::io::Error),

    #[error("assistant exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },
}

/// Runs one prompt to completion. Swap implementations without touching handlers.
///
/// Carried in `AppState` as `Arc<dyn AssistantRunner>`.
#[async_trait]
pub trait AssistantRunner: Send + Sync {
    async fn run(&self, prompt: &str, timeout: Duration) -> Result<String, AssistantError>;
}

/// Runs the assistant as a child process in print mode.
#[derive(Debug, Clone)]
pub struct CliAssistant {
    program: String,
}

impl CliAssistant {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl AssistantRunner for CliAssistant {
    async fn run(&self, prompt: &str, timeout: Duration) -> Result<String, AssistantError> {
        debug!(
            "Running {} with a {} char prompt (timeout {}s)",
            self.program,
            prompt.len(),
            timeout.as_secs()
        );

        let child = Command::new(&self.program)
            .arg("-p")
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AssistantError::Unavailable(self.program.clone()),
                _ => AssistantError::Io(e),
            })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| AssistantError::Timeout {
                secs: timeout.as_secs(),
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            if !stderr.is_empty() {
                warn!("Assistant stderr: {stderr}");
            }
            if stdout.is_empty() {
                return Err(AssistantError::Failed {
                    status: output.status.code().unwrap_or(-1),
                    stderr,
                });
            }
        }

        debug!("Assistant returned {} chars", stdout.len());
        Ok(stdout)
    }
}

/// Runs a prompt and normalizes the reply into a structured record.
/// A reply with no recoverable JSON is a `Normalized::ParseFailed`, not an error.
pub async fn ask_structured(
    runner: &dyn AssistantRunner,
    prompt: &str,
    timeout: Duration,
) -> Result<Normalized, AssistantError> {
    let raw = runner.run(prompt, timeout).await?;
    let normalized = normalize(&raw);
    if !normalized.is_record() {
        warn!("Assistant reply contained no JSON object ({} chars)", raw.len());
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let runner = CliAssistant::new("definitely-not-an-installed-assistant-cli");
        let err = runner
            .run("hello", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        // `echo -p <prompt>` prints its arguments, standing in for the CLI.
        let runner = CliAssistant::new("echo");
        let out = runner
            .run("bonjour", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "-p bonjour");
    }

    /// Executable script that blocks far longer than any test timeout.
    #[cfg(unix)]
    fn hanging_cli(dir: &std::path::Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("slow-assistant");
        std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_assistant_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CliAssistant::new(hanging_cli(dir.path()).to_string_lossy());

        let started = std::time::Instant::now();
        let err = runner.run("x", Duration::from_secs(1)).await.unwrap_err();

        assert!(matches!(err, AssistantError::Timeout { secs: 1 }), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_without_output_is_an_error() {
        let runner = CliAssistant::new("false");
        let err = runner.run("x", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, AssistantError::Failed { .. }));
    }
}
