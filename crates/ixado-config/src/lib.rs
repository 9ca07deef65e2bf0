//! Settings-file loading, merging, and validation for ixado.
//!
//! Reads an optional local settings file and an optional global settings
//! file, each a JSON document with `authorization.policy`,
//! `authorization.roles`, and `telegram.ownerId` subtrees (any of which
//! may be omitted). A missing file is a normal outcome; unreadable or
//! non-JSON content is an error. Final policy and role-resolution config
//! are each resolved independently with local-wins-over-global-over-
//! built-in-default precedence.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_core::{default_policy, AuthPolicy, RoleResolutionConfig, TelegramRoleEntry};
use serde::Deserialize;
use std::path::Path;

/// Errors raised while loading or validating a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but is not valid JSON.
    #[error("settings file {path} is not valid JSON: {reason}")]
    InvalidJson {
        /// The file that failed to parse.
        path: String,
        /// The underlying parse error.
        reason: String,
    },

    /// The file could not be read for a reason other than "missing".
    #[error("failed to read settings file {path}: {reason}")]
    ReadFailed {
        /// The file that failed to read.
        path: String,
        /// The underlying I/O error.
        reason: String,
    },

    /// The file's `authorization.policy` subtree fails schema validation.
    #[error("settings file {path} has an invalid authorization.policy: {reason}")]
    PolicyInvalid {
        /// The file whose policy is invalid.
        path: String,
        /// The validation failure.
        reason: String,
    },
}

impl From<ConfigError> for ixado_error::IxadoError {
    fn from(err: ConfigError) -> Self {
        use ixado_error::ErrorCode;
        let code = match &err {
            ConfigError::InvalidJson { .. } => ErrorCode::ConfigInvalidJson,
            ConfigError::ReadFailed { .. } => ErrorCode::ConfigReadFailed,
            ConfigError::PolicyInvalid { .. } => ErrorCode::ConfigPolicyInvalid,
        };
        ixado_error::IxadoError::new(code, err.to_string()).with_source(err)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    authorization: Option<AuthorizationSection>,
    #[serde(default)]
    telegram: Option<TelegramSection>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorizationSection {
    #[serde(default)]
    policy: Option<AuthPolicy>,
    #[serde(default)]
    roles: Option<RolesSection>,
}

#[derive(Debug, Default, Deserialize)]
struct RolesSection {
    #[serde(default, rename = "telegramRoles")]
    telegram_roles: Vec<TelegramRoleEntry>,
    #[serde(default, rename = "cliRole")]
    cli_role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramSection {
    #[serde(default, rename = "ownerId")]
    owner_id: Option<u64>,
}

/// Read and parse `path` as a settings file.
///
/// Returns `Ok(None)` when the file does not exist — that is a normal
/// outcome, not an error.
fn read_settings_file(path: &Path) -> Result<Option<SettingsFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    let parsed: SettingsFile = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(parsed))
}

fn extract_policy(path: &Path, settings: &SettingsFile) -> Result<Option<AuthPolicy>, ConfigError> {
    let Some(policy) = settings.authorization.as_ref().and_then(|a| a.policy.clone()) else {
        return Ok(None);
    };
    policy.validate().map_err(|e| ConfigError::PolicyInvalid {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(policy))
}

fn extract_role_config(settings: &SettingsFile) -> Option<RoleResolutionConfig> {
    let owner_id = settings.telegram.as_ref().and_then(|t| t.owner_id);
    let roles = settings.authorization.as_ref().and_then(|a| a.roles.as_ref());

    if owner_id.is_none() && roles.is_none() {
        return None;
    }

    Some(RoleResolutionConfig {
        telegram_owner_id: owner_id,
        telegram_roles: roles.map(|r| r.telegram_roles.clone()).unwrap_or_default(),
        cli_role: roles.and_then(|r| r.cli_role.clone()),
    })
}

/// Load the effective [`AuthPolicy`], trying `local` then `global` then
/// falling back to [`default_policy`].
pub fn load_policy(
    local: Option<&Path>,
    global: Option<&Path>,
) -> Result<AuthPolicy, ConfigError> {
    if let Some(path) = local {
        if let Some(settings) = read_settings_file(path)? {
            if let Some(policy) = extract_policy(path, &settings)? {
                tracing::debug!(path = %path.display(), "loaded policy from local settings file");
                return Ok(policy);
            }
        }
    }

    if let Some(path) = global {
        if let Some(settings) = read_settings_file(path)? {
            if let Some(policy) = extract_policy(path, &settings)? {
                tracing::debug!(path = %path.display(), "loaded policy from global settings file");
                return Ok(policy);
            }
        }
    }

    tracing::debug!("no policy found in local or global settings, using default");
    Ok(default_policy())
}

/// Load the effective [`RoleResolutionConfig`], trying `local` then
/// `global` then falling back to an empty default.
pub fn load_role_resolution_config(
    local: Option<&Path>,
    global: Option<&Path>,
) -> Result<RoleResolutionConfig, ConfigError> {
    if let Some(path) = local {
        if let Some(settings) = read_settings_file(path)? {
            if let Some(config) = extract_role_config(&settings) {
                tracing::debug!(path = %path.display(), "loaded role config from local settings file");
                return Ok(config);
            }
        }
    }

    if let Some(path) = global {
        if let Some(settings) = read_settings_file(path)? {
            if let Some(config) = extract_role_config(&settings) {
                tracing::debug!(path = %path.display(), "loaded role config from global settings file");
                return Ok(config);
            }
        }
    }

    tracing::debug!("no role resolution config found in local or global settings, using default");
    Ok(RoleResolutionConfig::default())
}

/// The environment variable naming an override for the global settings
/// file path.
pub const GLOBAL_CONFIG_FILE_ENV: &str = "IXADO_GLOBAL_CONFIG_FILE";

/// Resolve the global settings file path from `IXADO_GLOBAL_CONFIG_FILE`,
/// if set.
pub fn global_settings_path_from_env() -> Option<std::path::PathBuf> {
    std::env::var_os(GLOBAL_CONFIG_FILE_ENV).map(std::path::PathBuf::from)
}
