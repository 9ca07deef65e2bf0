use crate::pattern::Pattern;
use crate::role::Role;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered allow/deny rule set for a single role.
///
/// `allowlist` must be non-empty; `denylist` may be empty. Both are
/// evaluated in declared order — order is significant because the first
/// matching pattern wins (see `ixado-policy`'s `evaluate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoleRuleSet {
    /// Patterns that grant access, checked in order after the denylist.
    pub allowlist: Vec<Pattern>,
    /// Patterns that deny access, checked first, in order.
    #[serde(default)]
    pub denylist: Vec<Pattern>,
}

/// A versioned, per-role authorization policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuthPolicy {
    /// Schema version; currently always `"1"`.
    pub version: String,
    /// Rule set for each of the four roles. All four MUST be present.
    pub roles: BTreeMap<Role, RoleRuleSet>,
}

/// A policy document fails one of the schema invariants checked at load time.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A role has no rule set at all.
    #[error("policy is missing a rule set for role {0}")]
    MissingRole(Role),
    /// A role's allowlist is empty (only the owner invariant matters for
    /// well-formedness here, but an empty allowlist for any role means the
    /// role can never be granted anything, which is rejected as invalid).
    #[error("role {0}'s allowlist is empty")]
    EmptyAllowlist(Role),
    /// `roles.owner.allowlist` does not contain the literal `*`.
    #[error("owner's allowlist must contain the literal '*' pattern")]
    OwnerMustAllowAll,
    /// `roles.owner.denylist` is non-empty.
    #[error("owner's denylist must be empty")]
    OwnerDenylistNotEmpty,
}

impl AuthPolicy {
    /// Construct a policy, validating schema invariants.
    ///
    /// All four roles must be present with a non-empty allowlist, the
    /// owner's allowlist must contain the literal `*`, and the owner's
    /// denylist must be empty.
    pub fn new(roles: BTreeMap<Role, RoleRuleSet>) -> Result<Self, PolicyError> {
        Self::validate_roles(&roles)?;
        Ok(Self {
            version: "1".to_string(),
            roles,
        })
    }

    /// Re-check the schema invariants on an already-constructed policy.
    ///
    /// Used by settings loaders that deserialize an `AuthPolicy` directly
    /// (bypassing [`AuthPolicy::new`]) and must validate it afterward.
    pub fn validate(&self) -> Result<(), PolicyError> {
        Self::validate_roles(&self.roles)
    }

    fn validate_roles(roles: &BTreeMap<Role, RoleRuleSet>) -> Result<(), PolicyError> {
        for role in Role::ALL {
            let rules = roles.get(&role).ok_or(PolicyError::MissingRole(role))?;
            if rules.allowlist.is_empty() {
                return Err(PolicyError::EmptyAllowlist(role));
            }
        }
        let owner = roles.get(&Role::Owner).expect("checked above");
        if !owner.allowlist.iter().any(|p| p.as_str() == "*") {
            return Err(PolicyError::OwnerMustAllowAll);
        }
        if !owner.denylist.is_empty() {
            return Err(PolicyError::OwnerDenylistNotEmpty);
        }
        Ok(())
    }

    /// The rule set for `role`, if present.
    pub fn rules_for(&self, role: Role) -> Option<&RoleRuleSet> {
        self.roles.get(&role)
    }
}

/// Build the shipped default policy.
///
/// Viewer and operator carry explicit denies on privileged namespaces;
/// admin allows privileged git operations, config writes, agent actions,
/// and the read/execution/phase/task namespaces; owner is unrestricted.
pub fn default_policy() -> AuthPolicy {
    let pat = |s: &str| Pattern::new(s).expect("default policy patterns are well-formed");

    let mut roles = BTreeMap::new();

    roles.insert(
        Role::Viewer,
        RoleRuleSet {
            allowlist: vec![pat("read:*"), pat("status:*")],
            denylist: vec![
                pat("git:privileged:*"),
                pat("config:write"),
                pat("agent:*"),
            ],
        },
    );

    roles.insert(
        Role::Operator,
        RoleRuleSet {
            allowlist: vec![
                pat("read:*"),
                pat("status:*"),
                pat("execution:*"),
                pat("phase:*"),
                pat("task:*"),
            ],
            denylist: vec![
                pat("git:privileged:*"),
                pat("config:write"),
                pat("agent:*"),
            ],
        },
    );

    roles.insert(
        Role::Admin,
        RoleRuleSet {
            allowlist: vec![
                pat("git:privileged:*"),
                pat("config:write"),
                pat("agent:*"),
                pat("execution:*"),
                pat("phase:*"),
                pat("task:*"),
                pat("read:*"),
                pat("status:*"),
            ],
            denylist: vec![],
        },
    );

    roles.insert(
        Role::Owner,
        RoleRuleSet {
            allowlist: vec![pat("*")],
            denylist: vec![],
        },
    );

    AuthPolicy::new(roles).expect("default policy satisfies its own invariants")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = default_policy();
        assert_eq!(policy.version, "1");
        for role in Role::ALL {
            assert!(policy.rules_for(role).is_some());
        }
    }

    #[test]
    fn default_policy_owner_allows_everything() {
        let owner = default_policy().rules_for(Role::Owner).unwrap();
        assert_eq!(owner.allowlist.len(), 1);
        assert_eq!(owner.allowlist[0].as_str(), "*");
        assert!(owner.denylist.is_empty());
    }

    #[test]
    fn missing_role_is_rejected() {
        let mut roles = BTreeMap::new();
        roles.insert(
            Role::Owner,
            RoleRuleSet {
                allowlist: vec![Pattern::new("*").unwrap()],
                denylist: vec![],
            },
        );
        let err = AuthPolicy::new(roles).unwrap_err();
        assert!(matches!(err, PolicyError::MissingRole(_)));
    }

    #[test]
    fn empty_allowlist_is_rejected() {
        let mut roles = full_roles_with_owner_ok();
        roles.insert(
            Role::Viewer,
            RoleRuleSet {
                allowlist: vec![],
                denylist: vec![],
            },
        );
        let err = AuthPolicy::new(roles).unwrap_err();
        assert_eq!(err, PolicyError::EmptyAllowlist(Role::Viewer));
    }

    #[test]
    fn owner_without_wildcard_allow_is_rejected() {
        let mut roles = full_roles_with_owner_ok();
        roles.insert(
            Role::Owner,
            RoleRuleSet {
                allowlist: vec![Pattern::new("git:*").unwrap()],
                denylist: vec![],
            },
        );
        let err = AuthPolicy::new(roles).unwrap_err();
        assert_eq!(err, PolicyError::OwnerMustAllowAll);
    }

    #[test]
    fn owner_with_nonempty_denylist_is_rejected() {
        let mut roles = full_roles_with_owner_ok();
        roles.insert(
            Role::Owner,
            RoleRuleSet {
                allowlist: vec![Pattern::new("*").unwrap()],
                denylist: vec![Pattern::new("git:privileged:push").unwrap()],
            },
        );
        let err = AuthPolicy::new(roles).unwrap_err();
        assert_eq!(err, PolicyError::OwnerDenylistNotEmpty);
    }

    fn full_roles_with_owner_ok() -> BTreeMap<Role, RoleRuleSet> {
        let mut roles = BTreeMap::new();
        for role in Role::ALL {
            roles.insert(
                role,
                RoleRuleSet {
                    allowlist: vec![Pattern::new("read:*").unwrap()],
                    denylist: vec![],
                },
            );
        }
        roles.insert(
            Role::Owner,
            RoleRuleSet {
                allowlist: vec![Pattern::new("*").unwrap()],
                denylist: vec![],
            },
        );
        roles
    }
}
