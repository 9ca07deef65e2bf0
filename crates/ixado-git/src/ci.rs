use crate::error::GitError;
use crate::util::{require_positive, run_gh};
use ixado_core::{CiCheck, CiCheckState, CiStatusSummary};
use ixado_process::ProcessRunner;
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Fetch and normalize the CI status for pull request `pr_number`.
///
/// Runs `gh pr view <n> --json statusCheckRollup` and maps each entry's
/// `status`/`conclusion` pair onto [`CiCheckState`] per the fixed
/// normalization order, then reduces the set to an overall state.
pub async fn get_ci_status(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    pr_number: u64,
) -> Result<CiStatusSummary, GitError> {
    require_positive("pr number", pr_number as i64)?;
    let n = pr_number.to_string();
    let output = run_gh(runner, cwd, &["pr", "view", &n, "--json", "statusCheckRollup"]).await?;

    let parsed: PrViewOutput = serde_json::from_str(&output.stdout).map_err(|e| GitError::OutputParseFailed {
        reason: format!("could not parse `gh pr view` JSON: {e}"),
    })?;

    let checks: Vec<CiCheck> = parsed
        .status_check_rollup
        .into_iter()
        .map(|raw| CiCheck {
            state: normalize(&raw.status, raw.conclusion.as_deref()),
            name: raw.name,
            details_url: raw.details_url,
        })
        .collect();

    let overall = reduce(&checks);
    Ok(CiStatusSummary { overall, checks })
}

#[derive(Debug, Deserialize)]
struct PrViewOutput {
    #[serde(rename = "statusCheckRollup", default)]
    status_check_rollup: Vec<RawCheck>,
}

#[derive(Debug, Deserialize)]
struct RawCheck {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(rename = "detailsUrl", default)]
    details_url: Option<String>,
}

/// Normalize one check's raw `status`/`conclusion` pair.
fn normalize(status: &str, conclusion: Option<&str>) -> CiCheckState {
    let status = status.to_ascii_uppercase();
    let conclusion = conclusion.map(|c| c.to_ascii_uppercase());

    if matches!(
        status.as_str(),
        "QUEUED" | "IN_PROGRESS" | "PENDING" | "REQUESTED" | "WAITING"
    ) {
        return CiCheckState::Pending;
    }
    match conclusion.as_deref() {
        Some("SUCCESS") | Some("NEUTRAL") | Some("SKIPPED") => return CiCheckState::Success,
        Some("CANCELLED") => return CiCheckState::Cancelled,
        Some("FAILURE") | Some("TIMED_OUT") | Some("ACTION_REQUIRED") | Some("STARTUP_FAILURE") => {
            return CiCheckState::Failure;
        }
        _ => {}
    }
    CiCheckState::Unknown
}

/// Reduce a set of normalized checks to one overall state.
///
/// Any `FAILURE` wins outright; else any `PENDING`/`UNKNOWN` keeps the
/// overall pending; else any `CANCELLED` propagates; else a non-empty
/// all-`SUCCESS` set succeeds. An empty check list is `PENDING`.
fn reduce(checks: &[CiCheck]) -> CiCheckState {
    if checks.iter().any(|c| c.state == CiCheckState::Failure) {
        return CiCheckState::Failure;
    }
    if checks
        .iter()
        .any(|c| matches!(c.state, CiCheckState::Pending | CiCheckState::Unknown))
    {
        return CiCheckState::Pending;
    }
    if checks.iter().any(|c| c.state == CiCheckState::Cancelled) {
        return CiCheckState::Cancelled;
    }
    if !checks.is_empty() && checks.iter().all(|c| c.state == CiCheckState::Success) {
        return CiCheckState::Success;
    }
    CiCheckState::Pending
}

/// A deterministic summary of a [`CiStatusSummary`], used to detect
/// whether anything about it changed between two polls.
fn fingerprint(summary: &CiStatusSummary) -> String {
    let mut parts: Vec<String> = summary
        .checks
        .iter()
        .map(|c| format!("{}|{}|{}", c.name, c.state, c.details_url.as_deref().unwrap_or("")))
        .collect();
    parts.sort();
    format!("{}|{}", summary.overall, parts.join("|"))
}

/// Configuration for [`poll_ci_status`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between polls.
    pub interval: Duration,
    /// Wall-clock budget before giving up.
    pub timeout: Duration,
    /// Consecutive matching terminal observations required before returning.
    pub terminal_confirmations: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(15_000),
            timeout: Duration::from_millis(900_000),
            terminal_confirmations: 1,
        }
    }
}

/// One poll-loop transition report, passed to the `on_transition` callback
/// before the loop's internal state pointer advances.
#[derive(Debug, Clone)]
pub struct CiTransition {
    /// 1-based count of polls performed so far, including this one.
    pub poll_count: u32,
    /// The previous confirmed overall state, if any.
    pub previous_overall: Option<CiCheckState>,
    /// This poll's overall state.
    pub current_overall: CiCheckState,
    /// The previous fingerprint, if any.
    pub previous_fingerprint: Option<String>,
    /// This poll's fingerprint.
    pub current_fingerprint: String,
    /// `true` if the previous overall was terminal and this one is `PENDING`.
    pub is_rerun: bool,
    /// `true` if `current_overall` is one of the three terminal states.
    pub is_terminal: bool,
    /// Consecutive confirmed-terminal observation count after this poll.
    pub terminal_observation_count: u32,
}

/// Poll `get_ci_status` for `pr_number` until it reaches a confirmed
/// terminal state or `config.timeout` elapses.
///
/// `on_transition` is awaited with a [`CiTransition`] only on iterations
/// where the overall state or fingerprint actually changed from the
/// previous observation (including the first, since there is no prior
/// observation to match) — before the loop's internal previous-state
/// pointer is updated, so observers see a strictly monotone history. A
/// repeat observation of the same terminal snapshot, made purely to
/// satisfy `terminal_confirmations`, does not re-invoke the callback.
pub async fn poll_ci_status<F, Fut>(
    runner: &dyn ProcessRunner,
    cwd: &Path,
    pr_number: u64,
    config: PollConfig,
    mut on_transition: F,
) -> Result<CiStatusSummary, GitError>
where
    F: FnMut(CiTransition) -> Fut,
    Fut: Future<Output = ()>,
{
    let start = Instant::now();
    let mut poll_count = 0u32;
    let mut previous_overall: Option<CiCheckState> = None;
    let mut previous_fingerprint: Option<String> = None;
    let mut terminal_observation_count = 0u32;
    let mut last_summary;

    loop {
        if start.elapsed() >= config.timeout {
            return Err(GitError::CiPollTimeout {
                pr_number,
                timeout_ms: config.timeout.as_millis() as u64,
            });
        }

        let summary = get_ci_status(runner, cwd, pr_number).await?;
        poll_count += 1;
        let current_fingerprint = fingerprint(&summary);
        let is_terminal = summary.overall.is_terminal();

        let transitioned =
            previous_overall != Some(summary.overall) || previous_fingerprint.as_deref() != Some(&current_fingerprint);
        let is_rerun = matches!(previous_overall, Some(prev) if prev.is_terminal())
            && summary.overall == CiCheckState::Pending;

        let new_observation_count = if is_terminal {
            if previous_overall == Some(summary.overall) && previous_fingerprint.as_deref() == Some(&current_fingerprint) {
                terminal_observation_count + 1
            } else {
                1
            }
        } else {
            0
        };

        if transitioned {
            on_transition(CiTransition {
                poll_count,
                previous_overall,
                current_overall: summary.overall,
                previous_fingerprint: previous_fingerprint.clone(),
                current_fingerprint: current_fingerprint.clone(),
                is_rerun,
                is_terminal,
                terminal_observation_count: new_observation_count,
            })
            .await;
        }

        previous_overall = Some(summary.overall);
        previous_fingerprint = Some(current_fingerprint);
        terminal_observation_count = new_observation_count;
        last_summary = Some(summary);

        if is_terminal && terminal_observation_count >= config.terminal_confirmations.max(1) {
            return Ok(last_summary.expect("set above"));
        }

        if !(is_terminal && transitioned) {
            tokio::time::sleep(config.interval).await;
        }
    }
}
