use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The four cumulative workflow profile names, declared in ascending order.
///
/// `readonly ⊂ planning ⊂ execution ⊂ privileged` — each profile's action
/// set is a superset of every profile before it in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowProfileName {
    /// Read-only inspection actions.
    Readonly,
    /// Planning actions, in addition to readonly.
    Planning,
    /// Execution actions, in addition to planning.
    Execution,
    /// Privileged VCS actions, in addition to execution.
    Privileged,
}

impl WorkflowProfileName {
    /// The four profile names in ascending cumulative order.
    pub const ALL: [WorkflowProfileName; 4] = [
        WorkflowProfileName::Readonly,
        WorkflowProfileName::Planning,
        WorkflowProfileName::Execution,
        WorkflowProfileName::Privileged,
    ];
}

impl std::fmt::Display for WorkflowProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Readonly => "readonly",
            Self::Planning => "planning",
            Self::Execution => "execution",
            Self::Privileged => "privileged",
        };
        f.write_str(s)
    }
}

/// A named, cumulative set of primitive actions.
///
/// `actions` here already reflects the cumulative union through this
/// profile — see `ixado-profiles` for how the ordered, additive
/// declarations are folded into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowProfile {
    /// The profile's name.
    pub name: WorkflowProfileName,
    /// The ordered set of primitive action strings reachable at this profile.
    pub actions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_cumulative_order() {
        assert!(WorkflowProfileName::Readonly < WorkflowProfileName::Planning);
        assert!(WorkflowProfileName::Planning < WorkflowProfileName::Execution);
        assert!(WorkflowProfileName::Execution < WorkflowProfileName::Privileged);
    }

    #[test]
    fn serde_rename_lowercase() {
        let json = serde_json::to_string(&WorkflowProfileName::Execution).unwrap();
        assert_eq!(json, "\"execution\"");
    }
}
