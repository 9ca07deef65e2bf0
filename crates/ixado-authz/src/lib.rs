//! Fail-closed composition of policy loading, role resolution, and
//! primitive evaluation into a single decision for an orchestrator
//! action.
//!
//! [`authorize_orchestrator_action`] is the only operation this crate
//! exposes. It never propagates an error to its caller: every collaborator
//! failure (a bad settings file, an unresolved role, an unmapped action, a
//! panic-shaped evaluator bug) is converted into a structured
//! [`AuthDecision::Deny`] instead. This is the fail-closed property named
//! in the spec — callers get a decision, never an exception, from the
//! orchestration boundary.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_core::{AuthDecision, DenyReason, Role, SessionContext};
use std::path::{Path, PathBuf};

/// Input to [`authorize_orchestrator_action`].
#[derive(Debug, Clone)]
pub struct AuthorizeOrchestratorActionInput {
    /// The session the request originated from.
    pub session: SessionContext,
    /// The orchestrator action identifier being authorized
    /// (e.g. `git:branch-create`).
    pub action: String,
    /// An optional local (repo-level) settings file path.
    pub local_settings_path: Option<PathBuf>,
    /// An optional global settings file path.
    pub global_settings_path: Option<PathBuf>,
}

/// Authorize `input.action` for `input.session`, composing the policy
/// loader, role resolver, workflow-profile map, and evaluator.
///
/// Fail-closed composition, in order:
/// 1. Load the effective policy. A loader error denies with
///    `policy-load-failed`.
/// 2. Load the effective role-resolution config (same precedence rules),
///    then resolve a role from the session. A loader error, or a `None`
///    role, denies with `role-resolution-failed`.
/// 3. Look up the orchestrator action's required primitive actions. An
///    unmapped action denies with `missing-action-mapping`.
/// 4. Evaluate each required primitive action against the policy, in
///    order. The first deny is returned, with its reason and a message
///    citing both the orchestrator action and the primitive that failed.
/// 5. If every primitive is allowed, the whole orchestrator action is
///    allowed.
pub fn authorize_orchestrator_action(input: &AuthorizeOrchestratorActionInput) -> AuthDecision {
    let local = input.local_settings_path.as_deref();
    let global = input.global_settings_path.as_deref();

    let policy = match load_policy(local, global) {
        Ok(policy) => policy,
        Err(message) => {
            tracing::warn!(action = %input.action, %message, "authorization denied: policy load failed");
            return deny(None, &input.action, DenyReason::PolicyLoadFailed, Some(message));
        }
    };

    let role = match resolve_role(&input.session, local, global) {
        Ok(Some(role)) => role,
        Ok(None) => {
            tracing::warn!(action = %input.action, "authorization denied: role resolution returned no role");
            return deny(
                None,
                &input.action,
                DenyReason::RoleResolutionFailed,
                Some("no role could be resolved for this session".to_string()),
            );
        }
        Err(message) => {
            tracing::warn!(action = %input.action, %message, "authorization denied: role resolution failed");
            return deny(None, &input.action, DenyReason::RoleResolutionFailed, Some(message));
        }
    };

    let Some(primitives) = ixado_profiles::required_primitive_actions(&input.action) else {
        tracing::warn!(action = %input.action, "authorization denied: no profile mapping for orchestrator action");
        return deny(
            Some(role),
            &input.action,
            DenyReason::MissingActionMapping,
            Some(format!("orchestrator action {} has no entry in the action→profile map", input.action)),
        );
    };

    let mut matched_pattern = String::new();
    for primitive in &primitives {
        match ixado_policy::evaluate(Some(role), primitive, &policy) {
            AuthDecision::Allow { matched_pattern: p, .. } => {
                matched_pattern = p;
            }
            AuthDecision::Deny { reason, message, .. } => {
                let detail = message.unwrap_or_default();
                tracing::warn!(
                    action = %input.action,
                    primitive = %primitive,
                    %reason,
                    "authorization denied: primitive check failed"
                );
                return deny(
                    Some(role),
                    &input.action,
                    reason,
                    Some(format!(
                        "orchestrator action {} requires primitive {primitive}, which was denied: {detail}",
                        input.action
                    )),
                );
            }
        }
    }

    tracing::debug!(action = %input.action, %role, "authorization allowed");
    AuthDecision::Allow {
        role,
        action: input.action.clone(),
        matched_pattern,
    }
}

fn deny(
    role: Option<Role>,
    action: &str,
    reason: DenyReason,
    message: Option<String>,
) -> AuthDecision {
    AuthDecision::Deny {
        role,
        action: action.to_string(),
        reason,
        message,
    }
}

fn load_policy(local: Option<&Path>, global: Option<&Path>) -> Result<ixado_core::AuthPolicy, String> {
    ixado_config::load_policy(local, global).map_err(|e| e.to_string())
}

fn resolve_role(
    session: &SessionContext,
    local: Option<&Path>,
    global: Option<&Path>,
) -> Result<Option<Role>, String> {
    let config = ixado_config::load_role_resolution_config(local, global).map_err(|e| e.to_string())?;
    Ok(ixado_role::resolve_role(session, &config))
}
