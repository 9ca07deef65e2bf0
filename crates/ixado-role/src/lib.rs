//! Session-context-to-role resolution.
//!
//! `resolve_role` is fail-secure: any path that cannot produce one of the
//! four known role names returns `None` ("no role") rather than guessing
//! a privilege.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use ixado_core::{RoleResolutionConfig, Role, SessionContext};

/// Resolve a [`Role`] from a session context and resolution config.
///
/// - CLI sessions: absent `cliRole` trusts the local CLI as `owner`; a
///   present value (including an explicit empty string) is parsed, and
///   an unparseable value — including the empty string — resolves to
///   `None` rather than falling back to a default.
/// - Telegram sessions: a configured `telegramOwnerId` matching the
///   context's `userId` always wins as `owner`, overriding any entry in
///   `telegramRoles`. Otherwise, the first `telegramRoles` entry whose
///   `userId` matches is used (its role string parsed the same way, or
///   `None` if unrecognized) — the scan stops at the first match rather
///   than continuing to look for a better one.
pub fn resolve_role(context: &SessionContext, config: &RoleResolutionConfig) -> Option<Role> {
    match context {
        SessionContext::Cli => resolve_cli_role(config),
        SessionContext::Telegram { user_id } => resolve_telegram_role(*user_id, config),
    }
}

fn resolve_cli_role(config: &RoleResolutionConfig) -> Option<Role> {
    match &config.cli_role {
        None => {
            tracing::debug!("cli role absent, defaulting to owner");
            Some(Role::Owner)
        }
        Some(s) => {
            let role = Role::parse(s);
            if role.is_none() {
                tracing::warn!(cli_role = %s, "cli role present but unrecognized, denying");
            }
            role
        }
    }
}

fn resolve_telegram_role(user_id: u64, config: &RoleResolutionConfig) -> Option<Role> {
    if config.telegram_owner_id == Some(user_id) {
        tracing::debug!(user_id, "telegram owner id match, resolving to owner");
        return Some(Role::Owner);
    }

    for entry in &config.telegram_roles {
        if entry.user_id == user_id {
            let role = Role::parse(&entry.role);
            if role.is_none() {
                tracing::warn!(user_id, role = %entry.role, "telegram role entry unrecognized, denying");
            }
            return role;
        }
    }

    tracing::debug!(user_id, "no telegram role entry matched");
    None
}
