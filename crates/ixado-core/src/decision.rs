use crate::role::Role;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The closed set of reasons a deny decision can carry.
///
/// The first three are produced by the pure evaluator (`ixado-policy`);
/// the remaining four are produced only by the orchestration authorizer
/// (`ixado-authz`) when a collaborator step fails before evaluation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    /// No role could be resolved for the session.
    NoRole,
    /// A denylist pattern matched the action.
    DenylistMatch,
    /// No allowlist pattern matched the action.
    NoAllowlistMatch,
    /// The policy could not be loaded.
    PolicyLoadFailed,
    /// Role resolution raised or returned no role.
    RoleResolutionFailed,
    /// The evaluator raised while checking a primitive action.
    EvaluatorError,
    /// The orchestrator action has no entry in the action→profile map.
    MissingActionMapping,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoRole => "no-role",
            Self::DenylistMatch => "denylist-match",
            Self::NoAllowlistMatch => "no-allowlist-match",
            Self::PolicyLoadFailed => "policy-load-failed",
            Self::RoleResolutionFailed => "role-resolution-failed",
            Self::EvaluatorError => "evaluator-error",
            Self::MissingActionMapping => "missing-action-mapping",
        };
        f.write_str(s)
    }
}

/// The outcome of evaluating a role/action pair against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum AuthDecision {
    /// The action is permitted.
    Allow {
        /// The role the decision was made for.
        role: Role,
        /// The action that was checked.
        action: String,
        /// The pattern that matched, producing the allow.
        #[serde(rename = "matchedPattern")]
        matched_pattern: String,
    },
    /// The action is denied.
    Deny {
        /// The role the decision was made for, if one was resolved.
        role: Option<Role>,
        /// The action that was checked.
        action: String,
        /// Why the action was denied.
        reason: DenyReason,
        /// A human-readable message with additional context.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl AuthDecision {
    /// `true` if this is an [`AuthDecision::Allow`].
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// The action string, regardless of variant.
    pub fn action(&self) -> &str {
        match self {
            Self::Allow { action, .. } => action,
            Self::Deny { action, .. } => action,
        }
    }
}
