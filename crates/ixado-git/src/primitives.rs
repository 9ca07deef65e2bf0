use crate::error::GitError;
use crate::util::{require_non_empty, run_git};
use ixado_process::ProcessRunner;
use std::path::Path;

/// Create a new branch named `name` without switching to it.
pub async fn create_branch(runner: &dyn ProcessRunner, cwd: &Path, name: &str) -> Result<(), GitError> {
    require_non_empty("branch name", name)?;
    run_git(runner, cwd, &["branch", name]).await?;
    Ok(())
}

/// Switch the working tree to `reference` (a branch, tag, or commit-ish).
pub async fn checkout(runner: &dyn ProcessRunner, cwd: &Path, reference: &str) -> Result<(), GitError> {
    require_non_empty("checkout reference", reference)?;
    run_git(runner, cwd, &["checkout", reference]).await?;
    Ok(())
}

/// Add a new worktree at `path` checked out to `branch`.
pub async fn create_worktree(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    path: &str,
    branch: &str,
) -> Result<(), GitError> {
    require_non_empty("worktree path", path)?;
    require_non_empty("worktree branch", branch)?;
    run_git(runner, cwd, &["worktree", "add", path, branch]).await?;
    Ok(())
}

/// Remove the worktree at `path`, optionally forcing removal of a
/// worktree with local modifications.
pub async fn remove_worktree(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    path: &str,
    force: bool,
) -> Result<(), GitError> {
    require_non_empty("worktree path", path)?;
    if force {
        run_git(runner, cwd, &["worktree", "remove", "--force", path]).await?;
    } else {
        run_git(runner, cwd, &["worktree", "remove", path]).await?;
    }
    Ok(())
}

/// Rebase the current branch onto `onto`.
pub async fn rebase(runner: &dyn ProcessRunner, cwd: &Path, onto: &str) -> Result<(), GitError> {
    require_non_empty("rebase target", onto)?;
    run_git(runner, cwd, &["rebase", onto]).await?;
    Ok(())
}

/// Push `branch` to `remote` (default `origin`), setting upstream by
/// default (`-u`).
pub async fn push_branch(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    branch: &str,
    remote: Option<&str>,
    set_upstream: bool,
) -> Result<(), GitError> {
    require_non_empty("push branch", branch)?;
    let remote = remote.unwrap_or("origin");
    let mut args = vec!["push"];
    if set_upstream {
        args.push("-u");
    }
    args.push(remote);
    args.push(branch);
    run_git(runner, cwd, &args).await?;
    Ok(())
}

/// Stage all changes (`git add -A`).
pub async fn stage_all(runner: &dyn ProcessRunner, cwd: &Path) -> Result<(), GitError> {
    run_git(runner, cwd, &["add", "-A"]).await?;
    Ok(())
}

/// `true` if there are any staged (index) changes.
///
/// `git diff --cached --quiet` exits `1` when there are differences and
/// `0` when there are none; unlike the other primitives, a non-zero exit
/// here is the expected "yes" answer, not a failure.
pub async fn has_staged_changes(runner: &dyn ProcessRunner, cwd: &Path) -> Result<bool, GitError> {
    let args: Vec<String> = ["diff", "--cached", "--quiet"].iter().map(|s| s.to_string()).collect();
    let output = runner.run("git", &args, cwd).await?;
    match output.status {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(GitError::CommandFailed {
            program: "git".to_string(),
            args,
            status: output.status,
            stderr: output.stderr,
        }),
    }
}

/// Commit the currently staged changes with `message`.
pub async fn commit(runner: &dyn ProcessRunner, cwd: &Path, message: &str) -> Result<(), GitError> {
    require_non_empty("commit message", message)?;
    run_git(runner, cwd, &["commit", "-m", message]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixado_process::{CommandOutput, ScriptedProcessRunner};

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[tokio::test]
    async fn create_branch_rejects_empty_name() {
        let runner = ScriptedProcessRunner::new();
        let err = create_branch(&runner, Path::new("/repo"), "").await.unwrap_err();
        assert!(matches!(err, GitError::InvalidArgument { .. }));
        assert!(runner.was_never_called());
    }

    #[tokio::test]
    async fn create_branch_forwards_to_git() {
        let runner = ScriptedProcessRunner::new();
        runner.script("git", vec!["branch".to_string(), "feat-x".to_string()], ok(""));
        create_branch(&runner, Path::new("/repo"), "feat-x").await.unwrap();
    }

    #[tokio::test]
    async fn push_branch_defaults_to_origin_with_upstream() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["push".to_string(), "-u".to_string(), "origin".to_string(), "feat".to_string()],
            ok(""),
        );
        push_branch(&runner, Path::new("/repo"), "feat", None, true).await.unwrap();
    }

    #[tokio::test]
    async fn push_branch_honors_explicit_remote_and_no_upstream() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["push".to_string(), "upstream".to_string(), "feat".to_string()],
            ok(""),
        );
        push_branch(&runner, Path::new("/repo"), "feat", Some("upstream"), false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn has_staged_changes_true_on_exit_one() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["diff".to_string(), "--cached".to_string(), "--quiet".to_string()],
            CommandOutput { status: Some(1), stdout: String::new(), stderr: String::new() },
        );
        assert!(has_staged_changes(&runner, Path::new("/repo")).await.unwrap());
    }

    #[tokio::test]
    async fn has_staged_changes_false_on_exit_zero() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["diff".to_string(), "--cached".to_string(), "--quiet".to_string()],
            ok(""),
        );
        assert!(!has_staged_changes(&runner, Path::new("/repo")).await.unwrap());
    }

    #[tokio::test]
    async fn remove_worktree_force_adds_flag() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["worktree".to_string(), "remove".to_string(), "--force".to_string(), "../wt".to_string()],
            ok(""),
        );
        remove_worktree(&runner, Path::new("/repo"), "../wt", true).await.unwrap();
    }

    #[tokio::test]
    async fn commit_rejects_empty_message() {
        let runner = ScriptedProcessRunner::new();
        let err = commit(&runner, Path::new("/repo"), "   ").await.unwrap_err();
        assert!(matches!(err, GitError::InvalidArgument { .. }));
    }
}
