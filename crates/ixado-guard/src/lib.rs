//! The single choke point every privileged git/GitHub action must pass
//! through: authorize, audit the decision, execute, audit the outcome.
//!
//! [`PrivilegedGitActions`] is intentionally the *only* place in this
//! workspace that is allowed to call the `ixado-git` primitives for the
//! five gated operations. No runner call happens on a deny — the audit
//! record for the deny is durable before [`GuardError::AuthorizationDenied`]
//! is returned, and the runner is never touched.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_audit::AuditLog;
use ixado_core::{sha256_hex, AuditDecision as AuditOutcome, AuditLogEntry, AuthDecision, AuthPolicy, Role};
use ixado_error::{ErrorCode, IxadoError};
use ixado_git::{CreatePullRequestOptions, GitError, MergeMethod};
use ixado_process::ProcessRunner;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a gated [`PrivilegedGitActions`] operation.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The authorization check denied the action. The full deny decision
    /// is preserved for the caller.
    #[error("authorization denied for {action}")]
    AuthorizationDenied {
        /// The orchestrator action that was denied.
        action: String,
        /// The full decision, for logging or surfacing to the caller.
        decision: AuthDecision,
    },
    /// The underlying VCS primitive failed.
    #[error(transparent)]
    Git(#[from] GitError),
    /// Writing the audit record failed.
    #[error(transparent)]
    Audit(#[from] ixado_audit::AuditError),
}

impl From<GuardError> for IxadoError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::AuthorizationDenied { action, decision } => {
                IxadoError::new(ErrorCode::PolicyDenied, format!("authorization denied for {action}"))
                    .with_context("decision", format!("{decision:?}"))
            }
            GuardError::Git(e) => e.into(),
            GuardError::Audit(e) => e.into(),
        }
    }
}

/// Default actor identifier recorded on audit entries when the session
/// did not supply one (e.g. an unauthenticated CLI invocation).
pub const DEFAULT_ACTOR: &str = "system:unknown";

/// Wraps the five gated git/GitHub operations with authorization and
/// audit logging. Holds the collaborators needed to do both: a process
/// runner, the session's resolved role, the effective policy, an actor
/// identifier, and the audit log to write to.
pub struct PrivilegedGitActions<'a> {
    runner: &'a dyn ProcessRunner,
    cwd: PathBuf,
    role: Option<Role>,
    policy: AuthPolicy,
    actor: String,
    audit: &'a AuditLog,
}

impl<'a> PrivilegedGitActions<'a> {
    /// Construct a wrapper for one session's worth of gated operations.
    pub fn new(
        runner: &'a dyn ProcessRunner,
        cwd: impl Into<PathBuf>,
        role: Option<Role>,
        policy: AuthPolicy,
        audit: &'a AuditLog,
    ) -> Self {
        Self {
            runner,
            cwd: cwd.into(),
            role,
            policy,
            actor: DEFAULT_ACTOR.to_string(),
            audit,
        }
    }

    /// Override the actor identifier recorded on audit entries (e.g. a
    /// Telegram user id) instead of the [`DEFAULT_ACTOR`] default.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Create a new branch named `name`.
    pub async fn create_branch(&self, name: &str) -> Result<(), GuardError> {
        let target = format!("branch:{name}");
        let command = format!("git branch {name}");
        self.guarded("git:privileged:branch-create", &target, &command, || {
            ixado_git::create_branch(self.runner, &self.cwd, name)
        })
        .await
    }

    /// Rebase the current branch onto `onto`.
    pub async fn rebase(&self, onto: &str) -> Result<(), GuardError> {
        let target = format!("ref:{onto}");
        let command = format!("git rebase {onto}");
        self.guarded("git:privileged:rebase", &target, &command, || {
            ixado_git::rebase(self.runner, &self.cwd, onto)
        })
        .await
    }

    /// Push `branch` to `remote` (default `origin`).
    pub async fn push_branch(
        &self,
        branch: &str,
        remote: Option<&str>,
        set_upstream: bool,
    ) -> Result<(), GuardError> {
        let remote_name = remote.unwrap_or("origin");
        let target = format!("branch:{branch}@{remote_name}");
        let command = format!(
            "git push{} {remote_name} {branch}",
            if set_upstream { " -u" } else { "" }
        );
        self.guarded("git:privileged:push", &target, &command, || {
            ixado_git::push_branch(self.runner, &self.cwd, branch, remote, set_upstream)
        })
        .await
    }

    /// Open a pull request from `head` into `base`, returning its URL.
    pub async fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
        options: &CreatePullRequestOptions,
    ) -> Result<String, GuardError> {
        let target = format!("pr:{head}->{base}");
        let command = format!("gh pr create --base {base} --head {head} --title {title}");
        self.guarded("git:privileged:pr-create", &target, &command, || {
            ixado_git::create_pull_request(self.runner, &self.cwd, base, head, title, body, options)
        })
        .await
    }

    /// Merge pull request `pr_number` using `method`.
    pub async fn merge_pull_request(&self, pr_number: u64, method: MergeMethod) -> Result<(), GuardError> {
        let target = format!("pr:{pr_number}");
        let command = format!("gh pr merge {pr_number} --auto");
        self.guarded("git:privileged:pr-merge", &target, &command, || {
            ixado_git::merge_pull_request(self.runner, &self.cwd, pr_number, method)
        })
        .await
    }

    /// Authorize `action` against `target`, audit the decision, then run
    /// `execute` only if authorization allowed; audit the outcome on
    /// success. `execute`'s own error is propagated unchanged and is not
    /// recorded as a deny.
    async fn guarded<T, F, Fut>(
        &self,
        action: &str,
        target: &str,
        command: &str,
        execute: F,
    ) -> Result<T, GuardError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, GitError>>,
    {
        let decision = ixado_policy::evaluate(self.role, action, &self.policy);
        let is_deny = !decision.is_allow();

        let reason_string = match &decision {
            AuthDecision::Deny { reason, .. } => reason.to_string(),
            AuthDecision::Allow { matched_pattern, .. } => format!("matched:{matched_pattern}"),
        };
        self.audit.append(AuditLogEntry::new(
            self.actor.clone(),
            self.role,
            action,
            target,
            if is_deny { AuditOutcome::Deny } else { AuditOutcome::Allow },
            reason_string,
            sha256_hex(command),
        ))?;

        if is_deny {
            tracing::warn!(action, target, "privileged action denied");
            return Err(GuardError::AuthorizationDenied {
                action: action.to_string(),
                decision,
            });
        }

        let result = execute().await?;

        self.audit.append(AuditLogEntry::new(
            self.actor.clone(),
            self.role,
            action,
            target,
            AuditOutcome::Allow,
            "executed",
            sha256_hex(command),
        ))?;
        tracing::info!(action, target, "privileged action executed");

        Ok(result)
    }
}
