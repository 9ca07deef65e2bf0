//! Unified error taxonomy with stable error codes for ixado.
//!
//! Every ixado error carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause chain, and
//! arbitrary key-value context. Use the builder returned by
//! [`IxadoError::new`] to construct errors fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Policy schema / evaluation errors.
    Policy,
    /// Role resolution errors.
    Role,
    /// Settings / configuration loading errors.
    Config,
    /// Orchestration-authorizer composition errors.
    Authz,
    /// Audit log redaction, rotation, and append errors.
    Audit,
    /// Git/GitHub CLI invocation and parsing errors.
    Git,
    /// Process-runner invocation errors.
    Process,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Policy => "policy",
            Self::Role => "role",
            Self::Config => "config",
            Self::Authz => "authz",
            Self::Audit => "audit",
            Self::Git => "git",
            Self::Process => "process",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Policy --
    /// The policy document fails a schema invariant (e.g. owner rules).
    PolicyInvalid,
    /// A policy evaluation denied the action.
    PolicyDenied,

    // -- Role --
    /// The session context / role-resolution config could not yield a role.
    RoleResolutionFailed,

    // -- Config --
    /// Settings file contains invalid JSON.
    ConfigInvalidJson,
    /// Settings file's `authorization.policy` subtree fails validation.
    ConfigPolicyInvalid,
    /// Settings file could not be read for a reason other than "missing".
    ConfigReadFailed,

    // -- Authz --
    /// The orchestrator action has no entry in the action→profile map.
    AuthzMissingActionMapping,
    /// The evaluator raised while checking a primitive action.
    AuthzEvaluatorError,

    // -- Audit --
    /// The audit log entry or file could not be serialized/deserialized.
    AuditSerializationFailed,
    /// Rotating the audit log failed (other than a benign missing-slot skip).
    AuditRotationFailed,
    /// Appending to the audit log failed.
    AuditWriteFailed,

    // -- Git --
    /// The working tree has uncommitted changes where a clean tree was required.
    GitDirtyWorkingTree,
    /// A `git`/`gh` invocation exited non-zero.
    GitCommandFailed,
    /// A `git`/`gh` invocation's output could not be parsed as expected.
    GitOutputParseFailed,
    /// An argument to a VCS primitive failed local validation.
    GitInvalidArgument,
    /// The CI poll loop exceeded its timeout before a confirmed terminal state.
    GitCiPollTimeout,

    // -- Process --
    /// The external command could not be spawned.
    ProcessSpawnFailed,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PolicyInvalid | Self::PolicyDenied => ErrorCategory::Policy,

            Self::RoleResolutionFailed => ErrorCategory::Role,

            Self::ConfigInvalidJson | Self::ConfigPolicyInvalid | Self::ConfigReadFailed => {
                ErrorCategory::Config
            }

            Self::AuthzMissingActionMapping | Self::AuthzEvaluatorError => ErrorCategory::Authz,

            Self::AuditSerializationFailed
            | Self::AuditRotationFailed
            | Self::AuditWriteFailed => ErrorCategory::Audit,

            Self::GitDirtyWorkingTree
            | Self::GitCommandFailed
            | Self::GitOutputParseFailed
            | Self::GitInvalidArgument
            | Self::GitCiPollTimeout => ErrorCategory::Git,

            Self::ProcessSpawnFailed => ErrorCategory::Process,

            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation of the code (e.g.
    /// `"POLICY_DENIED"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolicyInvalid => "POLICY_INVALID",
            Self::PolicyDenied => "POLICY_DENIED",
            Self::RoleResolutionFailed => "ROLE_RESOLUTION_FAILED",
            Self::ConfigInvalidJson => "CONFIG_INVALID_JSON",
            Self::ConfigPolicyInvalid => "CONFIG_POLICY_INVALID",
            Self::ConfigReadFailed => "CONFIG_READ_FAILED",
            Self::AuthzMissingActionMapping => "AUTHZ_MISSING_ACTION_MAPPING",
            Self::AuthzEvaluatorError => "AUTHZ_EVALUATOR_ERROR",
            Self::AuditSerializationFailed => "AUDIT_SERIALIZATION_FAILED",
            Self::AuditRotationFailed => "AUDIT_ROTATION_FAILED",
            Self::AuditWriteFailed => "AUDIT_WRITE_FAILED",
            Self::GitDirtyWorkingTree => "GIT_DIRTY_WORKING_TREE",
            Self::GitCommandFailed => "GIT_COMMAND_FAILED",
            Self::GitOutputParseFailed => "GIT_OUTPUT_PARSE_FAILED",
            Self::GitInvalidArgument => "GIT_INVALID_ARGUMENT",
            Self::GitCiPollTimeout => "GIT_CI_POLL_TIMEOUT",
            Self::ProcessSpawnFailed => "PROCESS_SPAWN_FAILED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IxadoError
// ---------------------------------------------------------------------------

/// Unified ixado error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use ixado_error::{IxadoError, ErrorCode};
///
/// let err = IxadoError::new(ErrorCode::GitCommandFailed, "git push failed")
///     .with_context("exit_code", 1);
/// ```
pub struct IxadoError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl IxadoError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for IxadoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("IxadoError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for IxadoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for IxadoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of an [`IxadoError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IxadoErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&IxadoError> for IxadoErrorDto {
    fn from(err: &IxadoError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<IxadoErrorDto> for IxadoError {
    fn from(dto: IxadoErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            source: None,
            context: dto.context,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
