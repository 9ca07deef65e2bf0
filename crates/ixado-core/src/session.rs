use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The origin of an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SessionContext {
    /// A local, trusted CLI invocation.
    Cli,
    /// A message from the chat bot, identified by its numeric user id.
    Telegram {
        /// The chat platform's user id.
        #[serde(rename = "userId")]
        user_id: u64,
    },
}

/// A single `userId → role` mapping entry from settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TelegramRoleEntry {
    /// The chat platform's user id.
    #[serde(rename = "userId")]
    pub user_id: u64,
    /// The role string to resolve for this user, if recognized.
    pub role: String,
}

/// Configuration consulted by the role resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoleResolutionConfig {
    /// A Telegram user id granted unconditional owner privilege.
    #[serde(default, rename = "telegramOwnerId", skip_serializing_if = "Option::is_none")]
    pub telegram_owner_id: Option<u64>,
    /// Ordered `userId → role` mappings consulted after the owner-id check.
    #[serde(default, rename = "telegramRoles")]
    pub telegram_roles: Vec<TelegramRoleEntry>,
    /// The role to use for a local CLI session.
    ///
    /// Absent means "trust the local CLI as owner". An explicit empty
    /// string is present-but-unparseable and resolves to no role.
    #[serde(default, rename = "cliRole", skip_serializing_if = "Option::is_none")]
    pub cli_role: Option<String>,
}
