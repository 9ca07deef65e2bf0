//! Redacted, size-rotated, append-only audit log writer.
//!
//! [`AuditLog`] owns a single on-disk JSONL file. Every [`AuditLogEntry`]
//! passed to [`AuditLog::append`] is redacted field-by-field, rotated into
//! if the current file has grown past its configured threshold, then
//! serialized as one compact JSON object per line.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod redact;
mod rotate;

use ixado_core::AuditLogEntry;
use ixado_error::{ErrorCode, IxadoError};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that, when set, overrides the audit log's
/// on-disk location. Primarily used by tests and by deployments that
/// want the log outside the working tree.
pub const AUDIT_LOG_FILE_ENV: &str = "IXADO_AUDIT_LOG_FILE";

/// Default rotation threshold: 10 MiB.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated generations retained alongside the active file.
pub const DEFAULT_MAX_ROTATIONS: u32 = 5;

/// Errors raised while appending to the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The entry could not be serialized to JSON.
    #[error("failed to serialize audit entry: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Rotating the current log file failed.
    #[error("failed to rotate audit log at {path}: {source}")]
    Rotation {
        /// The log file path rotation was attempted on.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Appending the serialized entry to the log file failed.
    #[error("failed to write audit log at {path}: {source}")]
    Write {
        /// The log file path the write was attempted on.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl From<AuditError> for IxadoError {
    fn from(err: AuditError) -> Self {
        let code = match &err {
            AuditError::Serialization(_) => ErrorCode::AuditSerializationFailed,
            AuditError::Rotation { .. } => ErrorCode::AuditRotationFailed,
            AuditError::Write { .. } => ErrorCode::AuditWriteFailed,
        };
        let message = err.to_string();
        match err {
            AuditError::Serialization(source) => {
                IxadoError::new(code, message).with_source(source)
            }
            AuditError::Rotation { source, .. } | AuditError::Write { source, .. } => {
                IxadoError::new(code, message).with_source(source)
            }
        }
    }
}

/// Rotation and sizing knobs for an [`AuditLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditLogConfig {
    /// Rotate once the active file reaches this size, in bytes.
    pub max_size_bytes: u64,
    /// Number of rotated generations to retain (`path.1` .. `path.N`).
    pub max_rotations: u32,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_rotations: DEFAULT_MAX_ROTATIONS,
        }
    }
}

/// Resolve the audit log path for a working directory: the
/// [`AUDIT_LOG_FILE_ENV`] override if set, else `<cwd>/.ixado/audit.log`.
pub fn resolve_audit_log_path(cwd: &Path) -> PathBuf {
    if let Ok(path) = std::env::var(AUDIT_LOG_FILE_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    cwd.join(".ixado").join("audit.log")
}

/// Redact the free-text fields of an entry (`actor`, `action`, `target`,
/// `reason`) in place, leaving `timestamp`, `role`, `decision`, and
/// `commandHash` untouched.
fn redact_entry(mut entry: AuditLogEntry) -> AuditLogEntry {
    entry.actor = redact::redact(&entry.actor);
    entry.action = redact::redact(&entry.action);
    entry.target = redact::redact(&entry.target);
    entry.reason = redact::redact(&entry.reason);
    entry
}

/// An append-only, redacted, size-rotated audit log backed by a single file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    config: AuditLogConfig,
}

impl AuditLog {
    /// Build an `AuditLog` writing to `path` with `config`.
    pub fn new(path: PathBuf, config: AuditLogConfig) -> Self {
        Self { path, config }
    }

    /// Build an `AuditLog` for `cwd` using [`resolve_audit_log_path`] and
    /// the default rotation config.
    pub fn for_cwd(cwd: &Path) -> Self {
        Self::new(resolve_audit_log_path(cwd), AuditLogConfig::default())
    }

    /// The path this log currently writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Redact, rotate if needed, and append `entry` as one JSON line.
    pub fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| AuditError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        rotate::rotate_if_needed(&self.path, self.config.max_size_bytes, self.config.max_rotations)
            .map_err(|source| AuditError::Rotation {
                path: self.path.clone(),
                source,
            })?;

        let redacted = redact_entry(entry);
        let line = serde_json::to_string(&redacted).map_err(AuditError::Serialization)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::Write {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| AuditError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "appended audit log entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixado_core::{AuditDecision, Role};
    use tempfile::tempdir;

    fn entry(action: &str, reason: &str) -> AuditLogEntry {
        AuditLogEntry::new(
            "system:unknown",
            Some(Role::Admin),
            action,
            "branch:feat-x",
            AuditDecision::Allow,
            reason,
            "0".repeat(64),
        )
    }

    #[test]
    fn appends_one_json_line_per_entry() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"), AuditLogConfig::default());
        log.append(entry("git:privileged:push", "matched:git:privileged:*"))
            .unwrap();
        log.append(entry("status:check", "matched:status:*")).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(parsed.get("commandHash").is_some());
        }
    }

    #[test]
    fn redacts_secret_bearing_reason_before_writing() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"), AuditLogConfig::default());
        let secret = format!("ghp_{}", "A".repeat(36));
        log.append(entry("git:privileged:push", &format!("token {secret} leaked")))
            .unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(!contents.contains(&secret));
        assert!(contents.contains("[REDACTED]"));
    }

    #[test]
    fn command_hash_survives_redaction_unchanged() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"), AuditLogConfig::default());
        let hash = "a".repeat(64);
        let mut e = entry("git:privileged:push", "executed");
        e.command_hash = hash.clone();
        log.append(e).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(parsed["commandHash"], hash);
    }

    #[test]
    fn rotates_once_threshold_is_crossed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let config = AuditLogConfig {
            max_size_bytes: 1,
            max_rotations: 2,
        };
        let log = AuditLog::new(path.clone(), config);

        log.append(entry("status:check", "matched:status:*")).unwrap();
        log.append(entry("status:check", "matched:status:*")).unwrap();

        assert!(path.exists());
        assert!(rotate::rotated_path(&path, 1).exists());
    }

    #[test]
    fn resolve_audit_log_path_defaults_under_dot_ixado() {
        std::env::remove_var(AUDIT_LOG_FILE_ENV);
        let dir = tempdir().unwrap();
        let path = resolve_audit_log_path(dir.path());
        assert_eq!(path, dir.path().join(".ixado").join("audit.log"));
    }

    #[test]
    fn resolve_audit_log_path_honors_env_override() {
        let dir = tempdir().unwrap();
        let override_path = dir.path().join("custom.log");
        std::env::set_var(AUDIT_LOG_FILE_ENV, override_path.to_str().unwrap());
        let resolved = resolve_audit_log_path(Path::new("/irrelevant"));
        assert_eq!(resolved, override_path);
        std::env::remove_var(AUDIT_LOG_FILE_ENV);
    }
}
