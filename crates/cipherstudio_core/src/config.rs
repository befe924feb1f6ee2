//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS,
};
use rand::{distributions::Alphanumeric, Rng};
use std::env;
use std::fmt;
use std::path::PathBuf;

const EPHEMERAL_SECRET_LEN: usize = 48;

/// Runtime configuration for the CipherStudio backend.
#[derive(Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_body_size: usize,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &self.db_path)
            .field("port", &self.port)
            .field("max_body_size", &self.max_body_size)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn cache_root() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("cipherstudio")
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

fn jwt_secret_from_env() -> String {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => {
            tracing::warn!(
                "JWT_SECRET is not set; using an ephemeral secret. Issued tokens will not survive a restart"
            );
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(EPHEMERAL_SECRET_LEN)
                .map(char::from)
                .collect()
        }
    }
}

/// Directory holding client state (session, working copy, project cache).
///
/// # Returns
/// `CIPHER_HOME` when set (tilde expanded), otherwise
/// `~/.cache/cipherstudio/client`.
pub fn client_home_from_env_or_default() -> PathBuf {
    match env::var("CIPHER_HOME") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(expand_tilde(value)),
        _ => cache_root().join("client"),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| cache_root().join("db").to_string_lossy().to_string()),
            port: env_parsed("PORT").unwrap_or(DEFAULT_PORT),
            max_body_size: env_parsed("MAX_BODY_SIZE").unwrap_or(DEFAULT_MAX_BODY_SIZE),
            jwt_secret: jwt_secret_from_env(),
            token_ttl_secs: env_parsed("TOKEN_TTL_SECS").unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            bcrypt_cost: env_parsed("BCRYPT_COST").unwrap_or(DEFAULT_BCRYPT_COST),
        }
    }
}
