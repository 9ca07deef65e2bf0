use crate::role::Role;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The coarse outcome recorded on an [`AuditLogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    /// The action was permitted.
    Allow,
    /// The action was denied.
    Deny,
}

/// A single audit log record.
///
/// Constructed at each privileged call site, passed through redaction,
/// then serialized as one JSON object per newline-terminated line and
/// appended to the current log file. Field names and order here are
/// part of the external, on-disk contract — see the audit log crate for
/// the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditLogEntry {
    /// When the entry was recorded, UTC.
    pub timestamp: DateTime<Utc>,
    /// Who performed the action (e.g. `system:unknown`, a Telegram user id).
    pub actor: String,
    /// The resolved role, if any.
    pub role: Option<Role>,
    /// The action identifier that was checked or executed.
    pub action: String,
    /// A stable string identifying the object of the action
    /// (e.g. `branch:feat-x`, `pr:42`).
    pub target: String,
    /// The coarse outcome.
    pub decision: AuditDecision,
    /// A short machine-oriented reason (a [`crate::DenyReason`] string,
    /// `matched:<pattern>`, or `executed`).
    pub reason: String,
    /// 64-character lowercase hex SHA-256 digest of the executed command,
    /// or of the would-be command for a deny record.
    #[serde(rename = "commandHash")]
    pub command_hash: String,
}

impl AuditLogEntry {
    /// Construct an entry with `timestamp = now`.
    pub fn new(
        actor: impl Into<String>,
        role: Option<Role>,
        action: impl Into<String>,
        target: impl Into<String>,
        decision: AuditDecision,
        reason: impl Into<String>,
        command_hash: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.into(),
            role,
            action: action.into(),
            target: target.into(),
            decision,
            reason: reason.into(),
            command_hash: command_hash.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_match_external_contract() {
        let entry = AuditLogEntry::new(
            "system:unknown",
            Some(Role::Admin),
            "git:privileged:push",
            "branch:feat-x",
            AuditDecision::Allow,
            "matched:git:privileged:*",
            "0".repeat(64),
        );
        let json = serde_json::to_value(&entry).unwrap();
        for key in [
            "timestamp",
            "actor",
            "role",
            "action",
            "target",
            "decision",
            "reason",
            "commandHash",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn null_role_serializes_to_json_null() {
        let entry = AuditLogEntry::new(
            "telegram:7",
            None,
            "git:privileged:push",
            "branch:feat-x",
            AuditDecision::Deny,
            "no-role",
            "0".repeat(64),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], serde_json::Value::Null);
    }

    #[test]
    fn decision_serializes_lowercase() {
        let json = serde_json::to_string(&AuditDecision::Deny).unwrap();
        assert_eq!(json, "\"deny\"");
    }
}
