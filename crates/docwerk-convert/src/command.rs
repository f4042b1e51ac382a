// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Builder for one external process invocation with a timeout.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use docwerk_core::error::{DocwerkError, Result};

/// Default timeout when the caller sets none: 30 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How many trailing stderr lines are kept in error messages.
const STDERR_TAIL_LINES: usize = 8;

/// Output captured from a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Standard output (lossy UTF-8).
    pub stdout: String,
    /// Standard error (lossy UTF-8).
    pub stderr: String,
}

/// A command line plus its timeout.
///
/// The child is spawned with `kill_on_drop`, so when the timeout elapses the
/// dropped future takes the process down with it.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    /// File the command is working on, for error messages.
    subject: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            subject: None,
        }
    }

    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    pub fn subject(&mut self, name: impl Into<String>) -> &mut Self {
        self.subject = Some(name.into());
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`DocwerkError::EngineUnavailable`] if the program cannot be spawned.
    /// - [`DocwerkError::Timeout`] if it runs longer than the timeout.
    /// - [`DocwerkError::Engine`] on a non-zero exit, carrying the stderr tail.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let tool = self.program_name();
        let file = self.subject.clone().unwrap_or_default();
        debug!(tool = %tool, args = ?self.args, "spawning");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DocwerkError::EngineUnavailable(format!("{}: {e}", self.program.display()))
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(DocwerkError::Timeout {
                    tool,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let out = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !out.status.success() {
            return Err(DocwerkError::Engine {
                tool,
                file,
                detail: format!("exited with {}: {}", out.status, stderr_tail(&out.stderr)),
            });
        }

        Ok(out)
    }
}

/// Last few non-empty lines of stderr, joined with " | ".
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = (1..=20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 13"));
        assert!(tail.ends_with("line 20"));
    }

    #[test]
    fn stderr_tail_skips_blank_lines() {
        assert_eq!(stderr_tail("\n  \nTraceback\n\nValueError: bad\n"), "Traceback | ValueError: bad");
    }

    #[tokio::test]
    async fn nonexistent_program_is_unavailable() {
        let result = ToolCommand::new("nonexistent_tool_xyz_12345").execute().await;
        assert!(matches!(result, Err(DocwerkError::EngineUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_engine_error() {
        let result = ToolCommand::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .subject("report.pdf")
            .execute()
            .await;
        match result {
            Err(DocwerkError::Engine { file, detail, .. }) => {
                assert_eq!(file, "report.pdf");
                assert!(detail.contains("boom"), "unexpected detail: {detail}");
            }
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_fires() {
        let result = ToolCommand::new("sleep")
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        assert!(matches!(result, Err(DocwerkError::Timeout { .. })));
    }
}
