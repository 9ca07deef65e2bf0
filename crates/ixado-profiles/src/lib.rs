//! Cumulative workflow profiles and the orchestrator action → profile map.
//!
//! Two related but distinct things live here:
//!
//! - [`profile`]/[`cumulative_actions`]: the four named, cumulative
//!   permission scopes themselves (`readonly ⊂ planning ⊂ execution ⊂
//!   privileged`), materialized as pattern catalogues for introspection
//!   (e.g. "what can an `execution`-tier session touch").
//! - [`required_primitive_actions`]: the total mapping from a specific
//!   orchestrator action identifier to the concrete primitive action(s)
//!   it will exercise. This is what `ixado-authz` actually evaluates —
//!   checking the *catalogue* pattern (`git:privileged:*`) instead of the
//!   concrete action would make a deny's reported action the wildcard
//!   itself rather than the operation the caller asked for.
//!
//! [`profile_for_orchestrator_action`] is a total function over the same
//! key set as [`required_primitive_actions`]; an orchestrator action with
//! no entry in either is caught by both returning `None`, which
//! `ixado-authz` turns into a `missing-action-mapping` deny.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_core::{WorkflowProfile, WorkflowProfileName};
use std::collections::BTreeMap;

const READONLY_ADDITIONS: &[&str] = &["read:*", "status:*"];
const PLANNING_ADDITIONS: &[&str] = &["task:plan"];
const EXECUTION_ADDITIONS: &[&str] = &["execution:*", "phase:*", "task:*"];
const PRIVILEGED_ADDITIONS: &[&str] = &["git:privileged:*", "config:write", "agent:*"];

fn additions_through(name: WorkflowProfileName) -> Vec<&'static str> {
    let mut actions = Vec::new();
    actions.extend_from_slice(READONLY_ADDITIONS);
    if name >= WorkflowProfileName::Planning {
        actions.extend_from_slice(PLANNING_ADDITIONS);
    }
    if name >= WorkflowProfileName::Execution {
        actions.extend_from_slice(EXECUTION_ADDITIONS);
    }
    if name >= WorkflowProfileName::Privileged {
        actions.extend_from_slice(PRIVILEGED_ADDITIONS);
    }
    actions
}

/// The cumulative action-pattern catalogue for `name`: its own additions
/// plus every profile below it in `readonly ⊂ planning ⊂ execution ⊂
/// privileged`.
pub fn cumulative_actions(name: WorkflowProfileName) -> Vec<String> {
    additions_through(name)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Build the fully materialized [`WorkflowProfile`] for `name`.
pub fn profile(name: WorkflowProfileName) -> WorkflowProfile {
    WorkflowProfile {
        name,
        actions: cumulative_actions(name),
    }
}

/// One orchestrator action's required profile tier and the concrete
/// primitive action(s) it resolves to.
struct OrchestratorActionEntry {
    profile: WorkflowProfileName,
    primitives: &'static [&'static str],
}

fn orchestrator_actions() -> BTreeMap<&'static str, OrchestratorActionEntry> {
    use WorkflowProfileName::*;
    BTreeMap::from([
        (
            "status:check",
            OrchestratorActionEntry { profile: Readonly, primitives: &["status:check"] },
        ),
        (
            "read:logs",
            OrchestratorActionEntry { profile: Readonly, primitives: &["read:logs"] },
        ),
        (
            "plan:create",
            OrchestratorActionEntry { profile: Planning, primitives: &["task:plan"] },
        ),
        (
            "plan:review",
            OrchestratorActionEntry { profile: Planning, primitives: &["task:plan"] },
        ),
        (
            "task:execute",
            OrchestratorActionEntry { profile: Execution, primitives: &["execution:run-task"] },
        ),
        (
            "phase:advance",
            OrchestratorActionEntry { profile: Execution, primitives: &["phase:advance"] },
        ),
        (
            "git:branch-create",
            OrchestratorActionEntry {
                profile: Privileged,
                primitives: &["git:privileged:branch-create"],
            },
        ),
        (
            "git:rebase",
            OrchestratorActionEntry { profile: Privileged, primitives: &["git:privileged:rebase"] },
        ),
        (
            "git:push",
            OrchestratorActionEntry { profile: Privileged, primitives: &["git:privileged:push"] },
        ),
        (
            "git:pr-create",
            OrchestratorActionEntry {
                profile: Privileged,
                primitives: &["git:privileged:pr-create"],
            },
        ),
        (
            "git:pr-merge",
            OrchestratorActionEntry { profile: Privileged, primitives: &["git:privileged:pr-merge"] },
        ),
    ])
}

/// The total orchestrator action → required profile mapping.
pub fn action_profile_map() -> BTreeMap<&'static str, WorkflowProfileName> {
    orchestrator_actions()
        .into_iter()
        .map(|(action, entry)| (action, entry.profile))
        .collect()
}

/// The required profile for `orchestrator_action`, if it is known.
pub fn profile_for_orchestrator_action(orchestrator_action: &str) -> Option<WorkflowProfileName> {
    orchestrator_actions()
        .get(orchestrator_action)
        .map(|entry| entry.profile)
}

/// The ordered list of concrete primitive actions that must be
/// individually authorized for `orchestrator_action`, or `None` if the
/// action has no entry in the map.
pub fn required_primitive_actions(orchestrator_action: &str) -> Option<Vec<String>> {
    orchestrator_actions()
        .get(orchestrator_action)
        .map(|entry| entry.primitives.iter().map(|s| s.to_string()).collect())
}
