use ixado_error::{ErrorCode, IxadoError};

/// Errors raised by the git/gh primitives in this crate.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// `ensureCleanWorkingTree` found uncommitted changes.
    #[error("working tree is dirty: {details}")]
    DirtyWorkingTree {
        /// A human-readable summary of the dirty status lines.
        details: String,
    },

    /// A `git`/`gh` invocation exited non-zero.
    #[error("command `{program} {}` failed (status={status:?}): {stderr}", args.join(" "))]
    CommandFailed {
        /// The program that was invoked.
        program: String,
        /// The arguments passed.
        args: Vec<String>,
        /// The process exit status, if known.
        status: Option<i32>,
        /// Captured stderr.
        stderr: String,
    },

    /// A command's stdout could not be parsed as expected.
    #[error("failed to parse command output: {reason}")]
    OutputParseFailed {
        /// What went wrong.
        reason: String,
    },

    /// An argument failed local validation before a command was run.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// The CI poll loop exceeded its timeout before observing a confirmed
    /// terminal state.
    #[error("CI poll for PR #{pr_number} timed out after {timeout_ms}ms")]
    CiPollTimeout {
        /// The pull request number being polled.
        pr_number: u64,
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The underlying process runner failed to spawn the command.
    #[error(transparent)]
    Process(#[from] IxadoError),
}

impl From<GitError> for IxadoError {
    fn from(err: GitError) -> Self {
        if let GitError::Process(inner) = err {
            return inner;
        }
        let code = match &err {
            GitError::DirtyWorkingTree { .. } => ErrorCode::GitDirtyWorkingTree,
            GitError::CommandFailed { .. } => ErrorCode::GitCommandFailed,
            GitError::OutputParseFailed { .. } => ErrorCode::GitOutputParseFailed,
            GitError::InvalidArgument { .. } => ErrorCode::GitInvalidArgument,
            GitError::CiPollTimeout { .. } => ErrorCode::GitCiPollTimeout,
            GitError::Process(_) => unreachable!("handled above"),
        };
        IxadoError::new(code, err.to_string()).with_source(err)
    }
}
