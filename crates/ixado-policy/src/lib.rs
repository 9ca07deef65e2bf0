//! Pure authorization evaluator.
//!
//! `evaluate` is the only operation this crate exposes: a deterministic,
//! side-effect-free function from `(role, action, policy)` to an
//! [`AuthDecision`]. Denylist-wins semantics let a broad allow such as
//! `git:privileged:*` be selectively constrained without rewriting the
//! allowlist; default-deny on allowlist miss is the second safety net.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_core::{AuthDecision, AuthPolicy, DenyReason, Role};

/// Evaluate whether `role` may perform `action` under `policy`.
///
/// 1. No role → deny `no-role`.
/// 2. First denylist pattern match (declared order) → deny `denylist-match`.
/// 3. First allowlist pattern match (declared order) → allow, recording
///    the matched pattern.
/// 4. Otherwise → deny `no-allowlist-match`.
pub fn evaluate(role: Option<Role>, action: &str, policy: &AuthPolicy) -> AuthDecision {
    let Some(role) = role else {
        tracing::warn!(action, "authorization denied: no role");
        return AuthDecision::Deny {
            role: None,
            action: action.to_string(),
            reason: DenyReason::NoRole,
            message: None,
        };
    };

    // `rules_for` is only `None` for a policy that skipped `AuthPolicy::new`
    // validation; treat that defensively as a denylist-match rather than
    // panicking, since this function must never throw.
    let Some(rules) = policy.rules_for(role) else {
        tracing::warn!(%role, action, "authorization denied: role has no rule set");
        return AuthDecision::Deny {
            role: Some(role),
            action: action.to_string(),
            reason: DenyReason::NoAllowlistMatch,
            message: Some(format!("role {role} has no rule set in this policy")),
        };
    };

    if let Some(pattern) = rules.denylist.iter().find(|p| p.matches(action)) {
        tracing::warn!(%role, action, pattern = %pattern, "authorization denied: denylist match");
        return AuthDecision::Deny {
            role: Some(role),
            action: action.to_string(),
            reason: DenyReason::DenylistMatch,
            message: Some(format!("action {action} matches denylist pattern {pattern}")),
        };
    }

    if let Some(pattern) = rules.allowlist.iter().find(|p| p.matches(action)) {
        tracing::debug!(%role, action, pattern = %pattern, "authorization allowed");
        return AuthDecision::Allow {
            role,
            action: action.to_string(),
            matched_pattern: pattern.to_string(),
        };
    }

    tracing::warn!(%role, action, "authorization denied: no allowlist match");
    AuthDecision::Deny {
        role: Some(role),
        action: action.to_string(),
        reason: DenyReason::NoAllowlistMatch,
        message: Some(format!("no allowlist pattern for role {role} matches {action}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixado_core::default_policy;

    #[test]
    fn no_role_denies() {
        let policy = default_policy();
        let decision = evaluate(None, "git:privileged:push", &policy);
        assert!(matches!(
            decision,
            AuthDecision::Deny {
                role: None,
                reason: DenyReason::NoRole,
                ..
            }
        ));
    }

    #[test]
    fn owner_allows_everything() {
        let policy = default_policy();
        for action in [
            "git:privileged:push",
            "config:write",
            "agent:run",
            "anything:at:all",
        ] {
            let decision = evaluate(Some(Role::Owner), action, &policy);
            assert!(decision.is_allow(), "expected allow for {action}");
        }
    }

    #[test]
    fn viewer_denylist_beats_default_deny() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Viewer), "git:privileged:push", &policy);
        assert!(matches!(
            decision,
            AuthDecision::Deny {
                reason: DenyReason::DenylistMatch,
                ..
            }
        ));
    }

    #[test]
    fn viewer_allows_read_actions() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Viewer), "read:status", &policy);
        assert!(decision.is_allow());
    }

    #[test]
    fn operator_denied_privileged_git() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Operator), "git:privileged:branch-create", &policy);
        assert!(matches!(
            decision,
            AuthDecision::Deny {
                reason: DenyReason::DenylistMatch,
                ..
            }
        ));
    }

    #[test]
    fn operator_allowed_execution() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Operator), "execution:run-phase", &policy);
        assert!(decision.is_allow());
    }

    #[test]
    fn admin_allowed_privileged_git() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Admin), "git:privileged:push", &policy);
        assert!(decision.is_allow());
        if let AuthDecision::Allow { matched_pattern, .. } = decision {
            assert_eq!(matched_pattern, "git:privileged:*");
        }
    }

    #[test]
    fn no_allowlist_match_denies_by_default() {
        let policy = default_policy();
        let decision = evaluate(Some(Role::Viewer), "some:unmapped:action", &policy);
        assert!(matches!(
            decision,
            AuthDecision::Deny {
                reason: DenyReason::NoAllowlistMatch,
                ..
            }
        ));
    }

    #[test]
    fn denylist_checked_before_allowlist() {
        // admin has no denylist in the default policy, so construct a
        // custom policy where the same action would be allowed if only
        // the allowlist were checked but denied via a narrower denylist.
        use ixado_core::{AuthPolicy, Pattern, RoleRuleSet};
        use std::collections::BTreeMap;

        let mut roles = BTreeMap::new();
        for role in Role::ALL {
            roles.insert(
                role,
                RoleRuleSet {
                    allowlist: vec![Pattern::new("*").unwrap()],
                    denylist: vec![],
                },
            );
        }
        roles.insert(
            Role::Admin,
            RoleRuleSet {
                allowlist: vec![Pattern::new("git:*").unwrap()],
                denylist: vec![Pattern::new("git:privileged:push").unwrap()],
            },
        );
        let policy = AuthPolicy::new(roles).unwrap();

        let decision = evaluate(Some(Role::Admin), "git:privileged:push", &policy);
        assert!(matches!(
            decision,
            AuthDecision::Deny {
                reason: DenyReason::DenylistMatch,
                ..
            }
        ));
    }
}
