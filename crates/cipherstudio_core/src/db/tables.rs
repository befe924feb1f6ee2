//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical project rows (`Project`, bincode-encoded) keyed by project id.
pub const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");
/// Canonical account rows (`User`, bincode-encoded) keyed by user id.
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Username -> user id.
pub const USERS_BY_NAME: TableDefinition<&str, &str> = TableDefinition::new("users_by_name");
/// Normalized email -> user id.
pub const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");
