use crate::error::GitError;
use crate::util::{require_non_empty, require_positive, run_gh};
use ixado_process::ProcessRunner;
use std::path::Path;

/// The merge strategy for [`merge_pull_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// A standard merge commit.
    #[default]
    Merge,
    /// Squash all commits into one.
    Squash,
    /// Rebase the PR's commits onto the base branch.
    Rebase,
}

impl MergeMethod {
    fn as_flag(&self) -> &'static str {
        match self {
            Self::Merge => "--merge",
            Self::Squash => "--squash",
            Self::Rebase => "--rebase",
        }
    }
}

/// Optional parameters for [`create_pull_request`].
#[derive(Debug, Clone, Default)]
pub struct CreatePullRequestOptions {
    /// A PR template name to apply.
    pub template: Option<String>,
    /// Labels to attach, joined with `,` on the command line.
    pub labels: Vec<String>,
    /// Assignees to add, joined with `,` on the command line.
    pub assignees: Vec<String>,
    /// Open the PR as a draft.
    pub draft: bool,
}

/// Open a pull request via `gh pr create`, returning its URL.
pub async fn create_pull_request(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    base: &str,
    head: &str,
    title: &str,
    body: &str,
    options: &CreatePullRequestOptions,
) -> Result<String, GitError> {
    require_non_empty("base branch", base)?;
    require_non_empty("head branch", head)?;
    require_non_empty("title", title)?;

    let mut args: Vec<String> = vec![
        "pr".to_string(),
        "create".to_string(),
        "--base".to_string(),
        base.to_string(),
        "--head".to_string(),
        head.to_string(),
        "--title".to_string(),
        title.to_string(),
        "--body".to_string(),
        body.to_string(),
    ];

    if let Some(template) = &options.template {
        args.push("--template".to_string());
        args.push(template.clone());
    }
    if !options.labels.is_empty() {
        args.push("--label".to_string());
        args.push(options.labels.join(","));
    }
    if !options.assignees.is_empty() {
        args.push("--assignee".to_string());
        args.push(options.assignees.join(","));
    }
    if options.draft {
        args.push("--draft".to_string());
    }

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_gh(runner, cwd, &arg_refs).await?;

    output
        .stdout
        .lines()
        .find(|line| is_pull_request_url(line.trim()))
        .map(|line| line.trim().to_string())
        .ok_or_else(|| GitError::OutputParseFailed {
            reason: "no pull request URL found in `gh pr create` output".to_string(),
        })
}

fn is_pull_request_url(line: &str) -> bool {
    const PREFIX: &str = "https://github.com/";
    let Some(rest) = line.strip_prefix(PREFIX) else {
        return false;
    };
    let Some(idx) = rest.find("/pull/") else {
        return false;
    };
    let digits = &rest[idx + "/pull/".len()..];
    !digits.is_empty() && digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Merge pull request `pr_number` using `method`, enabling GitHub's
/// auto-merge (`--auto`).
pub async fn merge_pull_request(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    pr_number: u64,
    method: MergeMethod,
) -> Result<(), GitError> {
    require_positive("pr number", pr_number as i64)?;
    let n = pr_number.to_string();
    run_gh(runner, cwd, &["pr", "merge", &n, method.as_flag(), "--auto"]).await?;
    Ok(())
}

/// Mark a draft pull request ready for review.
pub async fn mark_pull_request_ready(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    pr_number: u64,
) -> Result<(), GitError> {
    require_positive("pr number", pr_number as i64)?;
    let n = pr_number.to_string();
    run_gh(runner, cwd, &["pr", "ready", &n]).await?;
    Ok(())
}

/// Extract the pull request number from a GitHub PR URL.
///
/// Accepts `/pull/42`, `/pull/42/`, `/pull/42?x=1`, `/pull/42#c`;
/// rejects anything else, including `/issues/42`.
pub fn parse_pull_request_number_from_url(url: &str) -> Result<u64, GitError> {
    let bad = || GitError::OutputParseFailed {
        reason: format!("could not parse a pull request number from {url:?}"),
    };

    let idx = url.find("/pull/").ok_or_else(bad)?;
    let after = &url[idx + "/pull/".len()..];
    let digit_count = after.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_count == 0 {
        return Err(bad());
    }
    let (digits, rest) = after.split_at(digit_count);
    match rest.chars().next() {
        None | Some('/') | Some('?') | Some('#') => digits.parse::<u64>().map_err(|_| bad()),
        _ => Err(bad()),
    }
}
