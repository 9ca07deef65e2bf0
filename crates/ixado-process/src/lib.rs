//! Capability interfaces for executing external commands and resolving
//! the global settings path.
//!
//! Both traits are one-method capability interfaces meant to be injected
//! via `Arc<dyn Trait>` — there is no inheritance hierarchy, and
//! production code depends only on the trait, never on
//! [`StdProcessRunner`] directly, so tests can substitute
//! [`ScriptedProcessRunner`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use ixado_error::{ErrorCode, IxadoError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The result of running an external command: exit status plus captured
/// stdout/stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The process exit code, or `None` if it was terminated by a signal.
    pub status: Option<i32>,
    /// Captured standard output, UTF-8 lossily decoded.
    pub stdout: String,
    /// Captured standard error, UTF-8 lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// `true` if the process exited with status `0`.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Executes an external command and returns its output.
///
/// A single suspension point per [`ProcessRunner::run`] call, consistent
/// with every other I/O boundary in this workspace.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` in `cwd`, returning its captured output.
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, IxadoError>;
}

/// A [`ProcessRunner`] backed by `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessRunner;

#[async_trait]
impl ProcessRunner for StdProcessRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, IxadoError> {
        tracing::info!(program, ?args, cwd = %cwd.display(), "dispatching external command");

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| {
                IxadoError::new(
                    ErrorCode::ProcessSpawnFailed,
                    format!("failed to spawn {program}: {e}"),
                )
                .with_context("program", program)
                .with_source(e)
            })?;

        let status = output.status.code();
        tracing::debug!(program, status, "external command completed");

        Ok(CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One scripted `(program, args) → CommandOutput` response.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    /// The program name to match.
    pub program: String,
    /// The argument list to match, compared exactly.
    pub args: Vec<String>,
    /// The canned response.
    pub output: CommandOutput,
}

/// A recorded invocation, for asserting what a [`ScriptedProcessRunner`]
/// was actually called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The program name passed to `run`.
    pub program: String,
    /// The argument list passed to `run`.
    pub args: Vec<String>,
    /// The working directory passed to `run`.
    pub cwd: PathBuf,
}

/// A test-double [`ProcessRunner`] that replays canned responses and
/// records every call it receives.
///
/// This is the seam that lets `ixado-git`/`ixado-guard` tests assert "no
/// runner call happened" after an authorization deny.
#[derive(Default)]
pub struct ScriptedProcessRunner {
    responses: Mutex<Vec<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProcessRunner {
    /// An empty scripted runner with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned response for a call matching `program`/`args` exactly.
    pub fn script(&self, program: impl Into<String>, args: Vec<String>, output: CommandOutput) {
        self.responses.lock().unwrap().push(ScriptedResponse {
            program: program.into(),
            args,
            output,
        });
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// `true` if [`ProcessRunner::run`] was never called.
    pub fn was_never_called(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedProcessRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, IxadoError> {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });

        let mut responses = self.responses.lock().unwrap();
        let pos = responses
            .iter()
            .position(|r| r.program == program && r.args == args);
        match pos {
            Some(i) => Ok(responses.remove(i).output),
            None => Err(IxadoError::new(
                ErrorCode::ProcessSpawnFailed,
                format!("no scripted response for {program} {args:?}"),
            )),
        }
    }
}

/// The environment variable naming an override for the global settings
/// file path.
pub const GLOBAL_CONFIG_FILE_ENV: &str = "IXADO_GLOBAL_CONFIG_FILE";

/// Resolves the optional global settings file path.
#[async_trait]
pub trait SettingsPathResolver: Send + Sync {
    /// The global settings file path, if one is configured.
    async fn global_settings_path(&self) -> Option<PathBuf>;
}

/// A [`SettingsPathResolver`] honoring [`GLOBAL_CONFIG_FILE_ENV`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettingsPathResolver;

#[async_trait]
impl SettingsPathResolver for EnvSettingsPathResolver {
    async fn global_settings_path(&self) -> Option<PathBuf> {
        std::env::var_os(GLOBAL_CONFIG_FILE_ENV).map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_runner_replays_canned_output() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["status".to_string()],
            CommandOutput {
                status: Some(0),
                stdout: "clean".to_string(),
                stderr: String::new(),
            },
        );

        let out = runner
            .run("git", &["status".to_string()], Path::new("/tmp"))
            .await
            .unwrap();
        assert_eq!(out.stdout, "clean");
        assert!(out.success());
    }

    #[tokio::test]
    async fn scripted_runner_records_calls() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["branch".to_string()],
            CommandOutput {
                status: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            },
        );
        assert!(runner.was_never_called());

        let _ = runner
            .run("git", &["branch".to_string()], Path::new("/repo"))
            .await;

        assert!(!runner.was_never_called());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "git");
        assert_eq!(calls[0].cwd, Path::new("/repo"));
    }

    #[tokio::test]
    async fn scripted_runner_errors_on_unscripted_call() {
        let runner = ScriptedProcessRunner::new();
        let result = runner.run("git", &["push".to_string()], Path::new("/tmp")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn env_resolver_reads_override() {
        // SAFETY-free, but env is process-global: run in this single test
        // and restore afterward rather than relying on test isolation.
        let previous = std::env::var_os(GLOBAL_CONFIG_FILE_ENV);
        std::env::set_var(GLOBAL_CONFIG_FILE_ENV, "/etc/ixado/global.json");

        let resolver = EnvSettingsPathResolver;
        let path = resolver.global_settings_path().await;
        assert_eq!(path, Some(PathBuf::from("/etc/ixado/global.json")));

        match previous {
            Some(v) => std::env::set_var(GLOBAL_CONFIG_FILE_ENV, v),
            None => std::env::remove_var(GLOBAL_CONFIG_FILE_ENV),
        }
    }

    #[test]
    fn command_output_success() {
        let ok = CommandOutput {
            status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        let failed = CommandOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());
        assert!(!failed.success());
    }
}
