use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A normalized CI check/overall state.
///
/// Normalization from provider-specific `status`/`conclusion` pairs into
/// this small terminal-state machine happens in `ixado-git`; this crate
/// only defines the resulting shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CiCheckState {
    /// Still running, queued, or waiting.
    Pending,
    /// Completed successfully (including neutral/skipped conclusions).
    Success,
    /// Completed unsuccessfully.
    Failure,
    /// Completed as cancelled.
    Cancelled,
    /// Completed with no conclusion that maps cleanly to the above.
    Unknown,
}

impl CiCheckState {
    /// `true` for the three terminal states (`SUCCESS`, `FAILURE`,
    /// `CANCELLED`); `false` for `PENDING`/`UNKNOWN`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Cancelled)
    }
}

impl std::fmt::Display for CiCheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A single named CI check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CiCheck {
    /// The check's name, as reported by the provider.
    pub name: String,
    /// Its normalized state.
    pub state: CiCheckState,
    /// A link to the check's detail page, if the provider supplied one.
    #[serde(rename = "detailsUrl", default, skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
}

/// The overall CI status for a pull request: a reduced state plus the
/// individual checks it was reduced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CiStatusSummary {
    /// The reduced overall state.
    pub overall: CiCheckState,
    /// The individual checks, in the order reported by the provider.
    pub checks: Vec<CiCheck>,
}
