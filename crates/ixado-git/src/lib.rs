//! Typed `git`/`gh` primitives, CI status normalization, and CI polling.
//!
//! Every operation here is a thin, validated forwarding call onto `git`
//! or `gh` through an injected [`ixado_process::ProcessRunner`]; none of
//! it decides whether the caller is *allowed* to run the command — that
//! lives one layer up, in the privileged-action wrapper.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod ci;
mod error;
mod pr;
mod primitives;
mod status;
mod util;

pub use ci::{get_ci_status, poll_ci_status, CiTransition, PollConfig};
pub use error::GitError;
pub use pr::{
    create_pull_request, mark_pull_request_ready, merge_pull_request,
    parse_pull_request_number_from_url, CreatePullRequestOptions, MergeMethod,
};
pub use primitives::{
    checkout, commit, create_branch, create_worktree, has_staged_changes, push_branch, rebase,
    remove_worktree, stage_all,
};
pub use status::{ensure_clean_working_tree, get_current_branch};
