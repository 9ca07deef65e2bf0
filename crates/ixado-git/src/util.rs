use crate::error::GitError;
use ixado_process::{CommandOutput, ProcessRunner};
use std::path::Path;

/// Run `git <args>` in `cwd`, turning a non-zero exit into
/// [`GitError::CommandFailed`].
pub(crate) async fn run_git(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    args: &[&str],
) -> Result<CommandOutput, GitError> {
    run(runner, "git", cwd, args).await
}

/// Run `gh <args>` in `cwd`, turning a non-zero exit into
/// [`GitError::CommandFailed`].
pub(crate) async fn run_gh(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    args: &[&str],
) -> Result<CommandOutput, GitError> {
    run(runner, "gh", cwd, args).await
}

async fn run(
    runner: &dyn ProcessRunner,
    program: &str,
    cwd: &Path,
    args: &[&str],
) -> Result<CommandOutput, GitError> {
    let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let output = runner.run(program, &owned, cwd).await?;
    if !output.success() {
        return Err(GitError::CommandFailed {
            program: program.to_string(),
            args: owned,
            status: output.status,
            stderr: output.stderr.clone(),
        });
    }
    Ok(output)
}

/// Validate a non-empty string argument, returning a descriptive error
/// naming `field` when it is empty or whitespace-only.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), GitError> {
    if value.trim().is_empty() {
        return Err(GitError::InvalidArgument {
            reason: format!("{field} must not be empty"),
        });
    }
    Ok(())
}

/// Validate a positive integer argument.
pub(crate) fn require_positive(field: &str, value: i64) -> Result<(), GitError> {
    if value <= 0 {
        return Err(GitError::InvalidArgument {
            reason: format!("{field} must be a positive integer, got {value}"),
        });
    }
    Ok(())
}
