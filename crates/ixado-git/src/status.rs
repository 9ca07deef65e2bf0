use crate::error::GitError;
use crate::util::run_git;
use ixado_process::ProcessRunner;
use std::path::Path;

/// The runtime artifact path exempted from the dirty-working-tree check.
const EXEMPT_PATH: &str = ".ixado/cli.log";

/// Assert the working tree at `cwd` has no uncommitted changes.
///
/// A single exemption applies: the runtime log file `.ixado/cli.log` is
/// never considered dirty, since the orchestrator itself writes to it
/// during a session.
pub async fn ensure_clean_working_tree(runner: &dyn ProcessRunner, cwd: &Path) -> Result<(), GitError> {
    let output = run_git(runner, cwd, &["status", "--porcelain=v1"]).await?;

    let dirty: Vec<&str> = output
        .stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            parse_status_path(line)
                .map(|path| path != EXEMPT_PATH)
                .unwrap_or(true)
        })
        .collect();

    if dirty.is_empty() {
        Ok(())
    } else {
        Err(GitError::DirtyWorkingTree {
            details: dirty.join("; "),
        })
    }
}

/// The current checked-out branch name at `cwd`.
///
/// Fails if HEAD is detached (empty output).
pub async fn get_current_branch(runner: &dyn ProcessRunner, cwd: &Path) -> Result<String, GitError> {
    let output = run_git(runner, cwd, &["branch", "--show-current"]).await?;
    let name = output.stdout.trim();
    if name.is_empty() {
        return Err(GitError::CommandFailed {
            program: "git".to_string(),
            args: vec!["branch".to_string(), "--show-current".to_string()],
            status: output.status,
            stderr: "HEAD is detached; no current branch".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Extract the path a single `git status --porcelain=v1` line refers to.
///
/// Handles the two-character mode prefix, quoted paths, and rename
/// (`A -> B`) entries, for which the destination path is returned.
fn parse_status_path(line: &str) -> Option<String> {
    if line.len() < 4 {
        return None;
    }
    let rest = line[3..].trim();
    let path = match rest.find(" -> ") {
        Some(idx) => &rest[idx + 4..],
        None => rest,
    };
    Some(unquote(path))
}

fn unquote(path: &str) -> String {
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        path[1..path.len() - 1].to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixado_process::{CommandOutput, ScriptedProcessRunner};

    fn ok_output(stdout: &str) -> CommandOutput {
        CommandOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn parses_simple_modified_line() {
        assert_eq!(parse_status_path(" M src/lib.rs"), Some("src/lib.rs".to_string()));
    }

    #[test]
    fn parses_untracked_line() {
        assert_eq!(parse_status_path("?? notes.txt"), Some("notes.txt".to_string()));
    }

    #[test]
    fn parses_quoted_path() {
        assert_eq!(
            parse_status_path(" M \"path with space.rs\""),
            Some("path with space.rs".to_string())
        );
    }

    #[test]
    fn parses_rename_takes_destination() {
        assert_eq!(
            parse_status_path("R  old.rs -> new.rs"),
            Some("new.rs".to_string())
        );
    }

    #[tokio::test]
    async fn clean_tree_passes() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["status".to_string(), "--porcelain=v1".to_string()],
            ok_output(""),
        );
        ensure_clean_working_tree(&runner, Path::new("/repo")).await.unwrap();
    }

    #[tokio::test]
    async fn dirty_tree_fails() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["status".to_string(), "--porcelain=v1".to_string()],
            ok_output(" M src/lib.rs\n"),
        );
        let err = ensure_clean_working_tree(&runner, Path::new("/repo"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::DirtyWorkingTree { .. }));
    }

    #[tokio::test]
    async fn only_exempt_path_dirty_still_passes() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["status".to_string(), "--porcelain=v1".to_string()],
            ok_output("?? .ixado/cli.log\n"),
        );
        ensure_clean_working_tree(&runner, Path::new("/repo")).await.unwrap();
    }

    #[tokio::test]
    async fn exempt_path_mixed_with_real_change_still_fails() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["status".to_string(), "--porcelain=v1".to_string()],
            ok_output("?? .ixado/cli.log\n M src/lib.rs\n"),
        );
        let err = ensure_clean_working_tree(&runner, Path::new("/repo"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::DirtyWorkingTree { .. }));
    }

    #[tokio::test]
    async fn current_branch_returns_trimmed_name() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["branch".to_string(), "--show-current".to_string()],
            ok_output("feat-x\n"),
        );
        let branch = get_current_branch(&runner, Path::new("/repo")).await.unwrap();
        assert_eq!(branch, "feat-x");
    }

    #[tokio::test]
    async fn detached_head_fails() {
        let runner = ScriptedProcessRunner::new();
        runner.script(
            "git",
            vec!["branch".to_string(), "--show-current".to_string()],
            ok_output(""),
        );
        let err = get_current_branch(&runner, Path::new("/repo")).await.unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
    }
}
